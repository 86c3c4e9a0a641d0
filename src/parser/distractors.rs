use itertools::Itertools;
use tracing::debug;

use crate::items::{QuestionItem, ANSWER_ONLY, QUESTION_TEXT};
use crate::mcq::{fill_options, McqResult};
use crate::random::RandomSource;

/// One question per item, with distractors taken from the sibling answers.
///
/// The result is parallel to `items`: positions whose item has no `answer`
/// hold `None`. Items are only read.
pub fn synthesize(items: &[QuestionItem], rng: &mut dyn RandomSource) -> Vec<Option<McqResult>> {
    let answers: Vec<Option<String>> = items.iter().map(|it| ANSWER_ONLY.text(it)).collect();

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let answer = answers[i].as_deref()?;
            let pool: Vec<String> = answers
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, a)| a.as_deref())
                .filter(|a| *a != answer)
                .unique()
                .map(str::to_string)
                .collect();
            let question = QUESTION_TEXT.text(item).unwrap_or_default();
            Some(fill_options(question, answer, &pool, rng))
        })
        .inspect(|q| {
            if q.is_none() {
                debug!("item without answer skipped");
            }
        })
        .collect()
}
