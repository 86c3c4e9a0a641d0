pub mod content;
pub mod distractors;
pub mod events;
pub mod explicit;
pub mod flashcards;
pub mod lines;
pub mod sentences;

use chrono::Utc;
use tracing::debug;

use crate::config::Settings;
use crate::items::QuestionItem;
use crate::mcq::McqResult;
use crate::random::RandomSource;
use crate::study_set::StudySet;
use flashcards::Flashcard;

/// Text and items → primary question, per-item questions, flashcards, events.
///
/// The primary question follows the `resolve` chain and degrades to a cloze
/// question from the prose. Per-item questions come from `items` or, when
/// none are supplied, from flashcards found in the text.
pub fn build_study_set(
    source: &str,
    raw_text: Option<&str>,
    items: Option<&[QuestionItem]>,
    settings: &Settings,
    rng: &mut dyn RandomSource,
) -> StudySet {
    let text = raw_text.unwrap_or_default();
    let cards = flashcards::extract_flashcards(text);
    let events = events::extract_events(text);

    let primary = content::resolve(raw_text, items, rng)
        .or_else(|| raw_text.and_then(|t| sentences::cloze(t, rng)));

    let derived: Vec<QuestionItem>;
    let question_items: &[QuestionItem] = match items {
        Some(it) if !it.is_empty() => it,
        _ => {
            derived = cards.iter().map(Flashcard::to_item).collect();
            &derived
        }
    };
    let mut questions = item_questions(question_items, rng);
    questions.truncate(settings.max_questions);

    debug!(
        source,
        primary = primary.is_some(),
        questions = questions.len(),
        flashcards = cards.len(),
        events = events.len(),
        "built study set"
    );

    StudySet {
        source: source.to_string(),
        generated_at: Utc::now(),
        primary,
        questions,
        flashcards: cards,
        events,
    }
}

/// Items that list their own options keep them; the rest get sibling
/// distractors. Results without a prompt are dropped.
pub fn item_questions(items: &[QuestionItem], rng: &mut dyn RandomSource) -> Vec<McqResult> {
    let synthesized = distractors::synthesize(items, rng);
    items
        .iter()
        .zip(synthesized)
        .filter_map(|(item, synth)| explicit::from_explicit(item).or(synth))
        .filter(|q| !q.question.is_empty())
        .collect()
}
