//! Session controller.
//!
//! [`QuizEngine`] owns the session, the score, and the current question.
//! It is driven by discrete events from a host (start, submissions, end,
//! timer ticks, deferred advances) and reports through a [`Presenter`].
//! Every method runs to completion before the next event is handled, so
//! no locking is involved.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{InputError, SessionError};
use crate::generator;
use crate::grader::{self, Answer};
use crate::note::Position;
use crate::question::Question;
use crate::session::{EndReason, Score, SessionConfig, SessionSummary, TimerDisplay};
use crate::traits::{ControlId, FeedbackKind, Presenter};

/// Pause between a resolved question and the next one.
pub const NEXT_QUESTION_DELAY: Duration = Duration::from_millis(950);

/// How often a host should call [`QuizEngine::tick`] during timed sessions.
pub const TIMER_TICK: Duration = Duration::from_millis(250);

/// Permission to present the next question once the feedback pause is over.
///
/// A ticket is bound to one session and one question. Handing back a ticket
/// from an ended or restarted session, or one that was already used, does
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    epoch: u64,
    sequence: u64,
}

/// What follows a graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The same question stays open.
    Retry,
    /// Wait [`NEXT_QUESTION_DELAY`], then call [`QuizEngine::advance`].
    Next(AdvanceTicket),
    /// The question limit was reached and the session has ended.
    SessionComplete,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing happened: no session, answering locked, or the input does
    /// not apply to the current question.
    Ignored,
    /// The input could not be parsed. Not counted as an attempt.
    Rejected(InputError),
    Correct(Resolution),
    Incorrect(Resolution),
}

impl SubmitOutcome {
    /// Whether the attempt was counted in the score.
    pub fn is_graded(&self) -> bool {
        matches!(self, SubmitOutcome::Correct(_) | SubmitOutcome::Incorrect(_))
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self {
            SubmitOutcome::Correct(r) | SubmitOutcome::Incorrect(r) => Some(*r),
            SubmitOutcome::Ignored | SubmitOutcome::Rejected(_) => None,
        }
    }
}

/// State of a running session.
#[derive(Debug)]
struct Session {
    config: SessionConfig,
    completed: u32,
    ends_at: Option<Instant>,
    question: Option<Question>,
    locked: bool,
    /// Number of questions presented so far; identifies the current one.
    sequence: u64,
    started_at: DateTime<Utc>,
}

/// The quiz engine.
pub struct QuizEngine<R = StdRng> {
    rng: R,
    session: Option<Session>,
    score: Score,
    /// Bumped on every start and end so stale tickets can be recognised.
    epoch: u64,
    last_summary: Option<SessionSummary>,
}

impl QuizEngine<StdRng> {
    /// Engine seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Engine with a reproducible question sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for QuizEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> QuizEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            session: None,
            score: Score::default(),
            epoch: 0,
            last_summary: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether submissions are currently refused.
    pub fn is_locked(&self) -> bool {
        self.session.as_ref().map_or(true, |s| s.locked)
    }

    /// Score of the running session, or of the last one after it ended.
    pub fn score(&self) -> Score {
        self.score
    }

    pub fn completed_questions(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.completed)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.as_ref().and_then(|s| s.question.as_ref())
    }

    /// Normalized configuration of the running session.
    pub fn config(&self) -> Option<&SessionConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    /// Whether the host should be delivering timer ticks.
    pub fn timer_armed(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.ends_at.is_some())
    }

    /// Description of the running session's settings.
    pub fn session_info(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.config.describe())
    }

    /// Report of the most recently ended session.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Start a session and present its first question.
    ///
    /// With no question kinds enabled the engine stays as it was and the
    /// reason is shown to the player. Starting while a session is running
    /// replaces it.
    pub fn start(
        &mut self,
        config: &SessionConfig,
        now: Instant,
        presenter: &mut dyn Presenter,
    ) -> Result<(), SessionError> {
        let config = config.normalized();
        if config.kinds.is_empty() {
            let err = SessionError::NoQuestionTypes;
            presenter.render_feedback(&err.to_string(), FeedbackKind::Bad);
            return Err(err);
        }

        if self.session.is_some() {
            tracing::debug!("restarting a running session");
        }

        self.epoch += 1;
        self.score = Score::default();
        self.last_summary = None;

        let time_limit = config.time_limit();
        let info = config.describe();
        tracing::debug!(
            mode = %config.mode,
            minutes = config.minutes,
            question_limit = config.question_limit,
            policy = %config.wrong_answer_policy,
            kinds = config.kinds.len(),
            "session started"
        );

        self.session = Some(Session {
            config,
            completed: 0,
            ends_at: time_limit.map(|limit| now + limit),
            question: None,
            locked: false,
            sequence: 0,
            started_at: Utc::now(),
        });

        presenter.render_score(&self.score);
        presenter.render_timer(match time_limit {
            Some(limit) => TimerDisplay::from_remaining(limit),
            None => TimerDisplay::NoLimit,
        });
        presenter.render_board_marker(None);
        presenter.render_feedback("", FeedbackKind::Neutral);
        presenter.render_session_info(&info);

        self.present_next_question(presenter);
        Ok(())
    }

    /// End the running session. Does nothing when idle.
    pub fn end(
        &mut self,
        reason: EndReason,
        presenter: &mut dyn Presenter,
    ) -> Option<SessionSummary> {
        let session = self.session.take()?;
        self.epoch += 1;

        let summary = SessionSummary {
            reason,
            score: self.score,
            percent: self.score.percent(),
            completed_questions: session.completed,
            mode: session.config.mode,
            wrong_answer_policy: session.config.wrong_answer_policy,
            started_at: session.started_at,
            ended_at: Utc::now(),
        };
        tracing::debug!(
            reason = ?reason,
            correct = summary.score.correct,
            total = summary.score.total,
            completed = summary.completed_questions,
            "session ended"
        );

        presenter.render_board_marker(None);
        presenter.render_session_summary(&summary.to_string());

        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    /// Refresh the countdown and end the session once time runs out.
    ///
    /// Returns `true` if this tick ended the session.
    pub fn tick(&mut self, now: Instant, presenter: &mut dyn Presenter) -> bool {
        let Some(ends_at) = self.session.as_ref().and_then(|s| s.ends_at) else {
            return false;
        };

        let display = TimerDisplay::from_remaining(ends_at.saturating_duration_since(now));
        presenter.render_timer(display);
        if display == TimerDisplay::Remaining(0) {
            self.end(EndReason::TimeUp, presenter);
            return true;
        }
        false
    }

    /// Present the next question if `ticket` still belongs to the live
    /// session's resolved question. Returns whether a question was shown.
    pub fn advance(&mut self, ticket: AdvanceTicket, presenter: &mut dyn Presenter) -> bool {
        let current = self
            .session
            .as_ref()
            .is_some_and(|s| s.locked && s.sequence == ticket.sequence);
        if ticket.epoch != self.epoch || !current {
            tracing::trace!(?ticket, "stale advance ticket dropped");
            return false;
        }
        self.present_next_question(presenter);
        true
    }

    /// Typed text or a note/letter button label.
    pub fn submit_typed_answer(&mut self, raw: &str, presenter: &mut dyn Presenter) -> SubmitOutcome {
        self.grade(Answer::Text(raw), None, presenter)
    }

    /// A string-letter button; `source` is echoed back for highlighting.
    pub fn submit_string_letter(
        &mut self,
        raw: &str,
        source: Option<ControlId>,
        presenter: &mut dyn Presenter,
    ) -> SubmitOutcome {
        self.grade(Answer::Text(raw), source, presenter)
    }

    /// A fretboard cell selection.
    pub fn submit_board_click(
        &mut self,
        position: Position,
        presenter: &mut dyn Presenter,
    ) -> SubmitOutcome {
        self.grade(Answer::Click(position), None, presenter)
    }

    fn grade(
        &mut self,
        answer: Answer<'_>,
        source: Option<ControlId>,
        presenter: &mut dyn Presenter,
    ) -> SubmitOutcome {
        let Some(session) = self.session.as_mut() else {
            return SubmitOutcome::Ignored;
        };
        if session.locked {
            return SubmitOutcome::Ignored;
        }
        let Some(question) = session.question.as_mut() else {
            return SubmitOutcome::Ignored;
        };

        let correct = match grader::check(question, answer) {
            Ok(Some(correct)) => correct,
            Ok(None) => return SubmitOutcome::Ignored,
            Err(err) => {
                presenter.render_feedback(&err.to_string(), FeedbackKind::Bad);
                return SubmitOutcome::Rejected(err);
            }
        };

        let verdict =
            grader::record_attempt(&mut self.score, correct, session.config.wrong_answer_policy);
        presenter.render_score(&self.score);

        let hits = grader::board_hits(question, answer, verdict);
        if !hits.is_empty() {
            presenter.render_board_hits(&hits);
        }
        if let Answer::Text(raw) = answer {
            if let Some(choices) = grader::string_choices(question, raw, verdict, source) {
                presenter.render_string_choices(&choices);
            }
        }
        let (message, kind) = verdict.feedback(question);
        presenter.render_feedback(&message, kind);
        tracing::debug!(
            kind = %question.kind(),
            ?verdict,
            correct = self.score.correct,
            total = self.score.total,
            "attempt graded"
        );

        let wrap = |resolution| {
            if correct {
                SubmitOutcome::Correct(resolution)
            } else {
                SubmitOutcome::Incorrect(resolution)
            }
        };

        if !verdict.resolves_question() {
            return wrap(Resolution::Retry);
        }

        session.locked = true;
        session.completed += 1;

        let goal_reached = session.config.mode.has_question_limit()
            && session.completed >= session.config.question_limit;
        if goal_reached {
            self.end(EndReason::GoalReached, presenter);
            return wrap(Resolution::SessionComplete);
        }

        wrap(Resolution::Next(AdvanceTicket {
            epoch: self.epoch,
            sequence: session.sequence,
        }))
    }

    fn present_next_question(&mut self, presenter: &mut dyn Presenter) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(question) = generator::generate(&session.config.kinds, &mut self.rng) else {
            tracing::warn!("no question kinds enabled in a running session");
            return;
        };

        session.sequence += 1;
        session.locked = false;
        tracing::debug!(sequence = session.sequence, kind = %question.kind(), "question presented");

        presenter.render_feedback("", FeedbackKind::Neutral);
        presenter.render_question(&question);
        presenter.render_board_marker(question.board_marker());
        session.question = Some(question);
    }
}
