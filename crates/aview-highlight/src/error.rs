//! Highlighting errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("Language name already registered: {0}")]
    DuplicateName(String),
    #[error("Unknown language: {name} (known: {known})")]
    UnknownLanguage { name: String, known: String },
}
