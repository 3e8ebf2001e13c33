//! fretquiz-core — Guitar fretboard quiz engine.
//!
//! This crate holds the note model, question generation, grading, and the
//! session controller. User interfaces plug in through the
//! [`traits::Presenter`] trait.

pub mod engine;
pub mod error;
pub mod generator;
pub mod grader;
pub mod note;
pub mod question;
pub mod session;
pub mod settings;
pub mod traits;

pub use engine::{AdvanceTicket, QuizEngine, Resolution, SubmitOutcome, NEXT_QUESTION_DELAY};
pub use error::{InputError, SessionError};
pub use question::{Question, QuestionKind};
pub use session::{EndReason, Score, SessionConfig, SessionMode, SessionSummary, WrongAnswerPolicy};
