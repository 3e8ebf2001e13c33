//! Quiz error types.
//!
//! Neither kind is fatal. Input errors reject a single attempt without
//! counting it; session errors keep the engine idle. The `Display` text of
//! each variant is the message shown to the player.

use thiserror::Error;

/// A submitted answer that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The text is not a note name or a known alias.
    #[error("Enter a note name (example: C, F#, Bb).")]
    MalformedNote(String),

    /// The text is not one of the string letters E, A, D, G, B.
    #[error("Use a string letter (E, A, D, G, or B).")]
    UnknownStringLetter(String),
}

impl InputError {
    /// The raw text that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            InputError::MalformedNote(raw) | InputError::UnknownStringLetter(raw) => raw,
        }
    }
}

/// Errors that prevent a session from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No question kind was enabled.
    #[error("Select at least one question type to begin.")]
    NoQuestionTypes,
}
