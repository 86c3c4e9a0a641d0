use serde::Serialize;
use tracing::debug;

use crate::random::{shuffle, RandomSource};

/// Filler for option slots that have no real candidate.
pub const SENTINEL: &str = "N/A";

pub const OPTION_COUNT: usize = 4;

/// Index reported when the correct answer cannot be located among the
/// options. Downstream scoring assumes a valid index always exists, so this
/// falls back instead of failing.
pub const UNRESOLVED_CORRECT_INDEX: usize = 0;

/// Distractors drawn per question.
const DISTRACTOR_SLOTS: usize = OPTION_COUNT - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McqResult {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: usize,
}

impl McqResult {
    /// Correctness is decided by index, never by comparing option text.
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn sentinel_count(&self) -> usize {
        self.options.iter().filter(|o| o.as_str() == SENTINEL).count()
    }
}

/// Pad with the sentinel or truncate so exactly four options remain.
pub fn normalize_options(mut options: Vec<String>) -> [String; OPTION_COUNT] {
    options.truncate(OPTION_COUNT);
    while options.len() < OPTION_COUNT {
        options.push(SENTINEL.to_string());
    }
    let mut it = options.into_iter();
    std::array::from_fn(|_| it.next().unwrap_or_else(|| SENTINEL.to_string()))
}

/// Position of `correct` in `options`, or the fallback index.
pub fn locate_correct(options: &[String], correct: &str) -> usize {
    options
        .iter()
        .position(|o| o == correct)
        .unwrap_or(UNRESOLVED_CORRECT_INDEX)
}

/// Build a question from one correct answer and a distractor pool.
///
/// Up to three distinct pool values are drawn without replacement from a local
/// copy of `pool`; missing slots become [`SENTINEL`]. The four options are then
/// shuffled and the correct index located after the shuffle.
pub fn fill_options(
    question: String,
    correct: &str,
    pool: &[String],
    rng: &mut dyn RandomSource,
) -> McqResult {
    let mut remaining: Vec<String> = pool.to_vec();
    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(correct.to_string());

    for _ in 0..DISTRACTOR_SLOTS {
        if remaining.is_empty() {
            options.push(SENTINEL.to_string());
            continue;
        }
        let idx = rng.pick_index(remaining.len());
        options.push(remaining.remove(idx));
    }

    shuffle(&mut options, rng);
    let correct_index = locate_correct(&options, correct);
    debug!(pool = pool.len(), correct_index, "filled options");

    McqResult {
        question,
        options: normalize_options(options),
        correct_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{PlatformRandom, SequenceRandom};
    use proptest::prelude::*;

    fn pool(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pads_short_lists() {
        let opts = normalize_options(pool(&["a", "b", "c"]));
        assert_eq!(opts, ["a", "b", "c", SENTINEL].map(String::from));
    }

    #[test]
    fn truncates_long_lists() {
        let opts = normalize_options(pool(&["a", "b", "c", "d", "e", "f"]));
        assert_eq!(opts, ["a", "b", "c", "d"].map(String::from));
    }

    #[test]
    fn unknown_correct_falls_back() {
        assert_eq!(locate_correct(&pool(&["x", "y"]), "z"), UNRESOLVED_CORRECT_INDEX);
        assert_eq!(locate_correct(&pool(&["x", "y"]), "y"), 1);
    }

    #[test]
    fn index_equality_decides_correctness() {
        let q = McqResult {
            question: "Pick".into(),
            options: ["same", "same", "N/A", "N/A"].map(String::from),
            correct_index: 1,
        };
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn empty_pool_gets_three_sentinels() {
        let q = fill_options("Only one?".into(), "Yes", &[], &mut SequenceRandom::new(vec![0.3]));
        assert_eq!(q.sentinel_count(), 3);
        assert_eq!(q.correct_option(), "Yes");
    }

    #[test]
    fn caller_pool_untouched() {
        let shared = pool(&["6", "10"]);
        let before = shared.clone();
        let _ = fill_options("2+2?".into(), "4", &shared, &mut SequenceRandom::new(vec![0.1, 0.7]));
        assert_eq!(shared, before);
    }

    #[test]
    fn fixed_sequence_gives_fixed_layout() {
        // Draws always take the pool head; shuffle with j = 0 rotates left.
        let q = fill_options(
            "Q".into(),
            "a",
            &pool(&["b", "c", "d"]),
            &mut SequenceRandom::new(vec![0.0]),
        );
        assert_eq!(q.options, ["b", "c", "d", "a"].map(String::from));
        assert_eq!(q.correct_index, 3);
    }

    #[test]
    fn serializes_camel_case() {
        let q = fill_options("Q".into(), "a", &[], &mut SequenceRandom::new(vec![0.99]));
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["correctIndex"], 0);
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    proptest! {
        #[test]
        fn filled_questions_hold_invariants(
            values in proptest::collection::hash_set("[a-z]{2,6}", 0..8),
            seed in any::<u64>(),
        ) {
            let values: Vec<String> = values.into_iter().collect();
            let (correct, rest) = match values.split_first() {
                Some((c, r)) => (c.clone(), r.to_vec()),
                None => ("answer".to_string(), Vec::new()),
            };
            let rest: Vec<String> = rest.into_iter().filter(|v| *v != correct).collect();
            let q = fill_options("Q".into(), &correct, &rest, &mut PlatformRandom::seeded(seed));

            prop_assert_eq!(q.options.len(), OPTION_COUNT);
            prop_assert!(q.correct_index < OPTION_COUNT);
            prop_assert_eq!(q.correct_option(), correct.as_str());
            prop_assert_eq!(q.sentinel_count(), DISTRACTOR_SLOTS.saturating_sub(rest.len()));

            let real: Vec<&String> = q.options.iter().filter(|o| o.as_str() != SENTINEL).collect();
            let mut dedup = real.clone();
            dedup.sort();
            dedup.dedup();
            prop_assert_eq!(real.len(), dedup.len());
        }
    }
}
