//! Turns OCR output, AI replies and study notes into multiple-choice
//! questions, flashcards and calendar entries.
//!
//! Three strategies run in order: [`parser::lines::scan`] looks for an already
//! formatted question block, [`parser::distractors::synthesize`] pairs each
//! item's answer with sibling answers, and [`parser::content::resolve`] chains
//! them into a single fallback. Every returned [`mcq::McqResult`] has exactly
//! four options and a valid correct index.

pub mod config;
pub mod error;
pub mod items;
pub mod mcq;
pub mod parser;
pub mod random;
pub mod study_set;

pub use crate::config::Settings;
pub use crate::error::{Error, Result};
pub use crate::items::{load_items, QuestionItem};
pub use crate::mcq::{McqResult, SENTINEL};
pub use crate::random::{PlatformRandom, RandomSource, SequenceRandom};
pub use crate::study_set::StudySet;
