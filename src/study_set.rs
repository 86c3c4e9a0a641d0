use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mcq::McqResult;
use crate::parser::events::CalendarEvent;
use crate::parser::flashcards::Flashcard;

/// Everything extracted from one source, ready to hand to the UI or save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySet {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub primary: Option<McqResult>,
    pub questions: Vec<McqResult>,
    pub flashcards: Vec<Flashcard>,
    pub events: Vec<CalendarEvent>,
}

impl StudySet {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
            && self.questions.is_empty()
            && self.flashcards.is_empty()
            && self.events.is_empty()
    }
}
