use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::items::QuestionItem;

static LIST_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d{1,3}[.)])\s+").unwrap());
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:q|question)\s*[:.]\s*(.+)$").unwrap());
static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:a|ans|answer)\s*[:.]\s*(.+)$").unwrap());
static COLON_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]{2,60}?)\s*:\s+(\S.*)$").unwrap());
static DASH_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.{2,60}?)\s+[-–—=]\s+(\S.*)$").unwrap());

const MAX_TERM_WORDS: usize = 6;
/// Labels that look like terms but belong to quiz formatting.
const RESERVED_TERMS: &[&str] = &[
    "answer",
    "correct",
    "correct answer",
    "question",
    "note",
    "page",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

impl Flashcard {
    /// Item form with `question`/`answer` keys, ready for distractor synthesis.
    pub fn to_item(&self) -> QuestionItem {
        QuestionItem::new()
            .with("question", self.front.as_str())
            .with("answer", self.back.as_str())
    }
}

/// Pull term/definition pairs out of notes.
///
/// Recognizes `Q:`/`A:` line pairs, `Term: definition`, and `Term - definition`
/// (also `–`, `—` and `=`). The first card for a front wins.
pub fn extract_flashcards(text: &str) -> Vec<Flashcard> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut cards = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut i = 0;

    while i < lines.len() {
        let line = LIST_PREFIX_RE.replace(lines[i], "");

        // ── Q:/A: pair ──
        if let Some(q) = QUESTION_RE.captures(&line) {
            let answer = lines
                .get(i + 1)
                .map(|next| LIST_PREFIX_RE.replace(next, ""))
                .and_then(|next| ANSWER_RE.captures(&next).map(|a| a[1].trim().to_string()));
            if let Some(back) = answer {
                push_card(&mut cards, &mut seen, q[1].trim(), &back);
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }

        // ── Term: definition / Term - definition ──
        let pair = COLON_PAIR_RE
            .captures(&line)
            .or_else(|| DASH_PAIR_RE.captures(&line))
            .map(|c| (c[1].trim().to_string(), c[2].trim().to_string()));
        if let Some((front, back)) = pair {
            if is_term(&front) {
                push_card(&mut cards, &mut seen, &front, &back);
            }
        }
        i += 1;
    }

    cards
}

fn is_term(front: &str) -> bool {
    let lower = front.to_lowercase();
    !RESERVED_TERMS.contains(&lower.as_str())
        && front.split_whitespace().count() <= MAX_TERM_WORDS
        && !front.ends_with('?')
        && front.chars().any(|c| c.is_alphabetic())
}

fn push_card(cards: &mut Vec<Flashcard>, seen: &mut HashSet<String>, front: &str, back: &str) {
    if front.is_empty() || back.is_empty() || !seen.insert(front.to_lowercase()) {
        return;
    }
    cards.push(Flashcard {
        front: front.to_string(),
        back: back.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ANSWER_ONLY, QUESTION_TEXT};

    #[test]
    fn colon_pairs() {
        let cards = extract_flashcards("Osmosis: diffusion of water across a membrane");
        assert_eq!(
            cards,
            vec![Flashcard {
                front: "Osmosis".into(),
                back: "diffusion of water across a membrane".into()
            }]
        );
    }

    #[test]
    fn dash_variants_and_bullets() {
        let text = "- Mitosis - cell division\n2. Meiosis — division producing gametes\n* pH = acidity scale";
        let fronts: Vec<String> = extract_flashcards(text).into_iter().map(|c| c.front).collect();
        assert_eq!(fronts, vec!["Mitosis", "Meiosis", "pH"]);
    }

    #[test]
    fn question_answer_pairs() {
        let cards = extract_flashcards("Q: What is ATP?\nA: The cell's energy currency\nQ: Dangling?");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "What is ATP?");
        assert_eq!(cards[0].back, "The cell's energy currency");
    }

    #[test]
    fn quiz_labels_and_urls_are_not_cards() {
        let text = "Answer: B\nSee http://example.com\nA: 4\nThe whole long reason for this is honestly quite simple: nope";
        assert!(extract_flashcards(text).is_empty());
    }

    #[test]
    fn first_front_wins() {
        let cards = extract_flashcards("Enzyme: catalyst\nenzyme: protein");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].back, "catalyst");
    }

    #[test]
    fn item_form() {
        let card = Flashcard {
            front: "Cell".into(),
            back: "Unit of life".into(),
        };
        let item = card.to_item();
        assert_eq!(QUESTION_TEXT.text(&item).as_deref(), Some("Cell"));
        assert_eq!(ANSWER_ONLY.text(&item).as_deref(), Some("Unit of life"));
    }

    #[test]
    fn notes_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/biology_notes.txt").unwrap();
        let cards = extract_flashcards(&text);
        let fronts: Vec<&str> = cards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["Nucleus", "Mitochondria", "Ribosome", "Cell membrane"]);
    }
}
