//! The presenter seam between the quiz engine and a user interface.
//!
//! The engine never draws anything itself. It issues render commands
//! through [`Presenter`], and the host forwards raw input back to the
//! engine's `submit_*` methods.

use std::collections::BTreeSet;

use crate::note::{Position, StringLetter};
use crate::question::Question;
use crate::session::{Score, TimerDisplay};

/// Tone of a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Good,
    Bad,
    Neutral,
}

/// Opaque handle for the input control that produced a submission.
///
/// The engine only echoes it back through [`StringChoiceFeedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub u32);

/// Outcome mark for one fretboard cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardHit {
    pub position: Position,
    pub kind: HitKind,
}

/// Button highlighting after a string-letter pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringChoiceFeedback {
    /// Letters tried and rejected for the current question.
    pub wrong: BTreeSet<StringLetter>,
    /// Correct letters, present once they may be shown.
    pub revealed: Option<BTreeSet<StringLetter>>,
    /// The letter just picked and whether it was right.
    pub picked: StringLetter,
    pub picked_correct: bool,
    /// Control that sent the pick, if the host supplied one.
    pub source: Option<ControlId>,
}

/// Render commands issued by the engine.
///
/// The last three methods carry optional visual detail and default to
/// doing nothing.
pub trait Presenter {
    fn render_question(&mut self, question: &Question);
    fn render_board_marker(&mut self, marker: Option<Position>);
    fn render_feedback(&mut self, message: &str, kind: FeedbackKind);
    fn render_score(&mut self, score: &Score);
    fn render_timer(&mut self, timer: TimerDisplay);
    fn render_session_summary(&mut self, summary: &str);

    fn render_session_info(&mut self, _info: &str) {}
    fn render_board_hits(&mut self, _hits: &[BoardHit]) {}
    fn render_string_choices(&mut self, _feedback: &StringChoiceFeedback) {}
}

/// Presenter that discards everything.
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn render_question(&mut self, _: &Question) {}
    fn render_board_marker(&mut self, _: Option<Position>) {}
    fn render_feedback(&mut self, _: &str, _: FeedbackKind) {}
    fn render_score(&mut self, _: &Score) {}
    fn render_timer(&mut self, _: TimerDisplay) {}
    fn render_session_summary(&mut self, _: &str) {}
}
