//! Question kinds and the question sum type.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::note::{ordinal, Fret, Note, Position, StringLetter};

/// The kinds of question a session can ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Name the note at a marked position.
    NoteId,
    /// Select the position of a named note on a named string.
    FindNote,
    /// Name the string(s) carrying a note at a given fret.
    NameString,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::NoteId,
        QuestionKind::FindNote,
        QuestionKind::NameString,
    ];
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::NoteId => write!(f, "note-id"),
            QuestionKind::FindNote => write!(f, "find-note"),
            QuestionKind::NameString => write!(f, "name-string"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "note-id" | "note" => Ok(QuestionKind::NoteId),
            "find-note" | "find" => Ok(QuestionKind::FindNote),
            "name-string" | "string" => Ok(QuestionKind::NameString),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A single quiz question.
///
/// Created by the generator, owned by the engine until it is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    NoteId {
        position: Position,
        answer: Note,
    },
    FindNote {
        position: Position,
        answer: Note,
    },
    NameString {
        fret: Fret,
        note: Note,
        answers: BTreeSet<StringLetter>,
        /// Letters already tried and rejected for this question.
        wrong_selections: BTreeSet<StringLetter>,
    },
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::NoteId { .. } => QuestionKind::NoteId,
            Question::FindNote { .. } => QuestionKind::FindNote,
            Question::NameString { .. } => QuestionKind::NameString,
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            Question::NoteId { .. } => "Name the note at the marked position.".to_string(),
            Question::FindNote { position, answer } => {
                format!("Find {answer} on the {}.", position.string.prompt_name())
            }
            Question::NameString { fret, note, .. } => {
                format!(
                    "What string has {note} on the {} fret?",
                    ordinal(fret.value())
                )
            }
        }
    }

    /// Sentence revealing the answer after a wrong attempt.
    pub fn correct_answer_text(&self) -> String {
        match self {
            Question::NoteId { answer, .. } => format!("The note is {answer}."),
            Question::FindNote { position, answer } => format!(
                "{answer} is on fret {} of the {}.",
                position.fret,
                position.string.prompt_name()
            ),
            Question::NameString { answers, .. } => {
                let letters: Vec<String> = answers.iter().map(|l| l.to_string()).collect();
                format!("The correct string is {}.", letters.join(" or "))
            }
        }
    }

    /// The cell to mark on the board while the question is open.
    pub fn board_marker(&self) -> Option<Position> {
        match self {
            Question::NoteId { position, .. } => Some(*position),
            Question::FindNote { .. } | Question::NameString { .. } => None,
        }
    }
}
