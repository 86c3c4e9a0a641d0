use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Keys under which an item list may be wrapped in a JSON object.
const LIST_KEYS: &[&str] = &["items", "questions", "flashcards", "cards"];

/// One unit of study content with loosely named fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct QuestionItem(pub Map<String, Value>);

impl QuestionItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Priority-ordered list of keys for one concept.
#[derive(Debug, Clone, Copy)]
pub struct FieldProbe {
    pub keys: &'static [&'static str],
}

pub const QUESTION_TEXT: FieldProbe = FieldProbe {
    keys: &[
        "question", "front", "statement", "sentence", "title", "label", "topic", "content", "text",
    ],
};

pub const ANSWER_TEXT: FieldProbe = FieldProbe {
    keys: &["answer", "back", "content", "response"],
};

/// Fields that mark an item as carrying its own prompt.
pub const CANDIDATE_QUESTION: FieldProbe = FieldProbe {
    keys: &["question", "front", "statement", "sentence"],
};

/// Fields feeding the collection-wide distractor pool.
pub const POOL_ANSWER: FieldProbe = FieldProbe {
    keys: &["answer", "back", "content"],
};

pub const ANSWER_ONLY: FieldProbe = FieldProbe { keys: &["answer"] };

pub const OPTIONS: FieldProbe = FieldProbe {
    keys: &["options", "choices"],
};

pub const CORRECTNESS: FieldProbe = FieldProbe {
    keys: &["correct", "answer"],
};

impl FieldProbe {
    /// First populated value, in key order.
    pub fn value<'a>(&self, item: &'a QuestionItem) -> Option<&'a Value> {
        self.keys
            .iter()
            .filter_map(|k| item.get(k))
            .find(|v| is_populated(v))
    }

    /// First populated value that reads as text.
    pub fn text(&self, item: &QuestionItem) -> Option<String> {
        self.keys
            .iter()
            .filter_map(|k| item.get(k))
            .find_map(value_text)
    }

    /// First non-empty array.
    pub fn list<'a>(&self, item: &'a QuestionItem) -> Option<Vec<&'a Value>> {
        self.keys.iter().filter_map(|k| item.get(k)).find_map(|v| match v {
            Value::Array(arr) if !arr.is_empty() => Some(arr.iter().collect()),
            _ => None,
        })
    }
}

/// Truthiness the way the item producers use it: empty strings, zero,
/// `false` and `null` count as missing.
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Strings and non-zero numbers read as text; everything else does not.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if is_populated(value) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an item list from JSON.
///
/// Accepts a bare array or an object wrapping the array under one of the
/// usual keys. Entries that are not objects are skipped.
pub fn load_items(json: &str) -> Result<Vec<QuestionItem>> {
    let root: Value = serde_json::from_str(json)?;
    let entries = match root {
        Value::Array(arr) => arr,
        Value::Object(mut obj) => LIST_KEYS
            .iter()
            .find_map(|k| match obj.remove(*k) {
                Some(Value::Array(arr)) => Some(arr),
                _ => None,
            })
            .ok_or(Error::NotAnItemList("an object without an item array"))?,
        Value::String(_) => return Err(Error::NotAnItemList("a string")),
        Value::Number(_) => return Err(Error::NotAnItemList("a number")),
        Value::Bool(_) => return Err(Error::NotAnItemList("a boolean")),
        Value::Null => return Err(Error::NotAnItemList("null")),
    };

    let total = entries.len();
    let items: Vec<QuestionItem> = entries
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(QuestionItem(map)),
            _ => None,
        })
        .collect();
    if items.len() < total {
        debug!(skipped = total - items.len(), "dropped non-object items");
    }
    Ok(items)
}
