use itertools::Itertools;
use tracing::debug;

use super::lines;
use crate::items::{QuestionItem, ANSWER_TEXT, CANDIDATE_QUESTION, POOL_ANSWER, QUESTION_TEXT};
use crate::mcq::{fill_options, McqResult};
use crate::random::RandomSource;

/// Pool answers this short are OCR noise.
const MIN_POOL_CHARS: usize = 2;

/// Ordered fallback: formatted text first, then one question built from the
/// whole item collection. `None` means every strategy came up empty and the
/// caller picks the next fallback.
pub fn resolve(
    raw_text: Option<&str>,
    items: Option<&[QuestionItem]>,
    rng: &mut dyn RandomSource,
) -> Option<McqResult> {
    if let Some(q) = raw_text.and_then(lines::scan) {
        debug!("resolved from formatted text");
        return Some(q);
    }

    let q = items
        .filter(|it| !it.is_empty())
        .and_then(|it| from_collection(it, rng));
    if q.is_none() {
        debug!("no strategy produced a question");
    }
    q
}

/// One question for the first item that carries a prompt, with distractors
/// drawn from every item in the collection.
pub fn from_collection(items: &[QuestionItem], rng: &mut dyn RandomSource) -> Option<McqResult> {
    let candidate = items
        .iter()
        .find(|it| CANDIDATE_QUESTION.text(it).is_some())
        .or_else(|| items.first())?;

    let correct = ANSWER_TEXT.text(candidate)?;
    let question = QUESTION_TEXT.text(candidate)?;

    let pool: Vec<String> = items
        .iter()
        .filter_map(|it| POOL_ANSWER.text(it))
        .filter(|a| a.chars().count() >= MIN_POOL_CHARS && *a != correct)
        .unique()
        .collect();

    debug!(pool = pool.len(), "building question from collection");
    Some(fill_options(question, &correct, &pool, rng))
}
