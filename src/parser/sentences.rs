use itertools::Itertools;
use tracing::debug;

use crate::mcq::{fill_options, McqResult};
use crate::random::RandomSource;

pub const BLANK: &str = "_____";

const MIN_WORDS: usize = 5;
const MIN_TERM_LETTERS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "because", "been", "before", "being", "between", "both", "could",
    "does", "each", "from", "have", "into", "more", "most", "much", "only", "other", "over",
    "same", "should", "some", "such", "than", "that", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "very", "were", "what", "when", "where", "which",
    "while", "will", "with", "within", "would", "your",
];

/// Split prose into sentences at `.`, `!` or `?` followed by whitespace.
/// Line breaks inside a sentence are folded into spaces.
pub fn split_sentences(text: &str) -> Vec<String> {
    let flat = text.split_whitespace().join(" ");
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = flat.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|(_, n)| n.is_whitespace()) {
            let end = i + c.len_utf8();
            push_sentence(&mut sentences, &flat[start..end]);
            start = end;
        }
    }
    push_sentence(&mut sentences, &flat[start..]);
    sentences
}

fn push_sentence(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

/// A sentence with its key term blanked out.
#[derive(Debug, Clone)]
struct Cloze {
    prompt: String,
    term: String,
}

fn word_core(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Longest non-stop word with enough letters; the earliest wins ties.
fn key_term_index(tokens: &[&str]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, tok) in tokens.iter().enumerate() {
        let core = word_core(tok);
        let letters = core.chars().filter(|c| c.is_alphabetic()).count();
        if letters < MIN_TERM_LETTERS || STOP_WORDS.contains(&core.to_lowercase().as_str()) {
            continue;
        }
        let len = core.chars().count();
        if best.map_or(true, |(_, l)| len > l) {
            best = Some((i, len));
        }
    }
    best.map(|(i, _)| i)
}

fn to_cloze(sentence: &str) -> Option<Cloze> {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    if tokens.len() < MIN_WORDS {
        return None;
    }
    let idx = key_term_index(&tokens)?;
    let term = word_core(tokens[idx]).to_string();
    let prompt = tokens
        .iter()
        .enumerate()
        .map(|(i, tok)| {
            if i == idx {
                tok.replacen(term.as_str(), BLANK, 1)
            } else {
                tok.to_string()
            }
        })
        .join(" ");
    Some(Cloze { prompt, term })
}

/// Fill-in-the-blank questions from plain prose, at most `limit`.
///
/// Distractors are the key terms of the other qualifying sentences.
pub fn cloze_questions(text: &str, limit: usize, rng: &mut dyn RandomSource) -> Vec<McqResult> {
    let clozes: Vec<Cloze> = split_sentences(text).iter().filter_map(|s| to_cloze(s)).collect();
    debug!(sentences = clozes.len(), "cloze candidates");

    clozes
        .iter()
        .take(limit)
        .map(|c| {
            let pool: Vec<String> = clozes
                .iter()
                .map(|o| o.term.as_str())
                .filter(|t| !t.eq_ignore_ascii_case(&c.term))
                .unique_by(|t| t.to_lowercase())
                .map(str::to_string)
                .collect();
            fill_options(c.prompt.clone(), &c.term, &pool, rng)
        })
        .collect()
}

/// The first cloze question, if the text has a usable sentence.
pub fn cloze(text: &str, rng: &mut dyn RandomSource) -> Option<McqResult> {
    cloze_questions(text, 1, rng).into_iter().next()
}
