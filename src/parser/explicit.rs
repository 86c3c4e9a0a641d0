use serde_json::{Map, Value};
use tracing::debug;

use super::lines::answer_token_index;
use crate::items::{value_text, FieldProbe, QuestionItem, CORRECTNESS, OPTIONS, QUESTION_TEXT};
use crate::mcq::{normalize_options, McqResult, OPTION_COUNT, UNRESOLVED_CORRECT_INDEX};

/// Numeric fields read as zero-based option indexes, in priority order.
const INDEX_KEYS: &[&str] = &[
    "correct",
    "correctIndex",
    "correct_index",
    "correct_answer",
    "answerIndex",
];

/// Text of an option given as an object.
const OPTION_TEXT: FieldProbe = FieldProbe {
    keys: &["text", "label", "option", "value", "content"],
};
const OPTION_FLAG_KEYS: &[&str] = &["correct", "isCorrect", "is_correct", "isAnswer", "is_answer"];

/// Options as listed, minus unusable entries and repeated values.
struct OptionList {
    options: Vec<String>,
    /// Kept position for every raw entry, so raw indexes stay meaningful.
    kept_at: Vec<Option<usize>>,
    flagged: Option<usize>,
}

/// Normalize an item that already lists its own options.
///
/// Needs a prompt and at least two distinct options. The correct index comes
/// from, in order: a numeric zero-based index field, a letter or 1-based
/// digit given as text, an option object flagged correct, then
/// `correct`/`answer` text matched against the options.
pub fn from_explicit(item: &QuestionItem) -> Option<McqResult> {
    let entries = OPTIONS.list(item)?;
    let question = QUESTION_TEXT.text(item)?;

    let list = collect_options(&entries);
    if list.options.len() < 2 {
        debug!(options = list.options.len(), "too few explicit options");
        return None;
    }

    let raw_to_kept = |raw: usize| list.kept_at.get(raw).copied().flatten();
    let correct_index = index_field(item)
        .and_then(raw_to_kept)
        .or_else(|| stated_token(item, &list.options).and_then(raw_to_kept))
        .or(list.flagged)
        .or_else(|| stated_text(item, &list.options))
        .filter(|i| *i < OPTION_COUNT)
        .unwrap_or(UNRESOLVED_CORRECT_INDEX);

    Some(McqResult {
        question,
        options: normalize_options(list.options),
        correct_index,
    })
}

fn collect_options(entries: &[&Value]) -> OptionList {
    let mut list = OptionList {
        options: Vec::with_capacity(entries.len()),
        kept_at: Vec::with_capacity(entries.len()),
        flagged: None,
    };
    for entry in entries {
        let (text, is_flagged) = match entry {
            Value::Object(obj) => (object_text(obj), object_flagged(obj)),
            other => (value_text(other), false),
        };
        let Some(text) = text else {
            list.kept_at.push(None);
            continue;
        };
        let pos = match list.options.iter().position(|o| *o == text) {
            Some(existing) => existing,
            None => {
                list.options.push(text);
                list.options.len() - 1
            }
        };
        list.kept_at.push(Some(pos));
        if is_flagged && list.flagged.is_none() {
            list.flagged = Some(pos);
        }
    }
    list
}

fn object_text(obj: &Map<String, Value>) -> Option<String> {
    OPTION_TEXT.keys.iter().filter_map(|k| obj.get(*k)).find_map(value_text)
}

fn object_flagged(obj: &Map<String, Value>) -> bool {
    OPTION_FLAG_KEYS
        .iter()
        .any(|k| matches!(obj.get(*k), Some(Value::Bool(true))))
}

fn index_field(item: &QuestionItem) -> Option<usize> {
    INDEX_KEYS
        .iter()
        .find_map(|k| item.get(k).and_then(Value::as_u64))
        .map(|i| i as usize)
}

/// A single letter or digit such as `C`, `c)` or `3`, given as a string.
/// A token that is itself one of the option texts is left to the text match.
fn stated_token(item: &QuestionItem, options: &[String]) -> Option<usize> {
    CORRECTNESS.keys.iter().find_map(|k| match item.get(k) {
        Some(Value::String(s)) => {
            let token = s.trim().trim_end_matches([')', '.', ':']);
            let is_option = options.iter().any(|o| o.eq_ignore_ascii_case(s.trim()));
            if token.chars().count() == 1 && !is_option {
                answer_token_index(token)
            } else {
                None
            }
        }
        _ => None,
    })
}

fn stated_text(item: &QuestionItem, options: &[String]) -> Option<usize> {
    let stated = CORRECTNESS.keys.iter().filter_map(|k| item.get(k)).find_map(value_text)?;
    options.iter().position(|o| o.eq_ignore_ascii_case(&stated))
}
