//! Session configuration, score, and the values the engine reports.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::question::QuestionKind;

/// How a session decides when it is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Runs until the player ends it.
    #[default]
    Free,
    /// Ends when the time limit runs out.
    Timed,
    /// Ends after a fixed number of questions.
    Questions,
    /// Ends on whichever limit is hit first.
    TimedQuestions,
}

impl SessionMode {
    pub fn is_timed(self) -> bool {
        matches!(self, SessionMode::Timed | SessionMode::TimedQuestions)
    }

    pub fn has_question_limit(self) -> bool {
        matches!(self, SessionMode::Questions | SessionMode::TimedQuestions)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Free => "Free Study",
            SessionMode::Timed => "Timed",
            SessionMode::Questions => "Question Count",
            SessionMode::TimedQuestions => "Timed + Question Count",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Free => write!(f, "free"),
            SessionMode::Timed => write!(f, "timed"),
            SessionMode::Questions => write!(f, "questions"),
            SessionMode::TimedQuestions => write!(f, "timed-questions"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(SessionMode::Free),
            "timed" => Ok(SessionMode::Timed),
            "questions" | "count" => Ok(SessionMode::Questions),
            "timed-questions" => Ok(SessionMode::TimedQuestions),
            other => Err(format!("unknown session mode: {other}")),
        }
    }
}

/// What happens after a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrongAnswerPolicy {
    /// Show the correct answer and move on.
    #[default]
    RevealNext,
    /// Keep the same question open until it is answered correctly.
    RetryUntilCorrect,
}

impl WrongAnswerPolicy {
    pub fn label(self) -> &'static str {
        match self {
            WrongAnswerPolicy::RevealNext => "Reveal + next",
            WrongAnswerPolicy::RetryUntilCorrect => "Retry until correct",
        }
    }
}

impl fmt::Display for WrongAnswerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrongAnswerPolicy::RevealNext => write!(f, "reveal-next"),
            WrongAnswerPolicy::RetryUntilCorrect => write!(f, "retry-until-correct"),
        }
    }
}

impl FromStr for WrongAnswerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reveal-next" | "reveal" => Ok(WrongAnswerPolicy::RevealNext),
            "retry-until-correct" | "retry" => Ok(WrongAnswerPolicy::RetryUntilCorrect),
            other => Err(format!("unknown wrong-answer policy: {other}")),
        }
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Enabled question kinds. Must not be empty.
    pub kinds: Vec<QuestionKind>,
    pub mode: SessionMode,
    /// Time limit in minutes. Clamped to at least 1.
    pub minutes: u32,
    /// Question limit. Clamped to at least 1.
    pub question_limit: u32,
    pub wrong_answer_policy: WrongAnswerPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            kinds: QuestionKind::ALL.to_vec(),
            mode: SessionMode::Free,
            minutes: 2,
            question_limit: 30,
            wrong_answer_policy: WrongAnswerPolicy::RevealNext,
        }
    }
}

impl SessionConfig {
    /// Copy with duplicate kinds removed and limits clamped.
    pub fn normalized(&self) -> Self {
        let mut kinds = Vec::with_capacity(self.kinds.len());
        for kind in &self.kinds {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        Self {
            kinds,
            mode: self.mode,
            minutes: self.minutes.max(1),
            question_limit: self.question_limit.max(1),
            wrong_answer_policy: self.wrong_answer_policy,
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.mode
            .is_timed()
            .then(|| Duration::from_secs(u64::from(self.minutes.max(1)) * 60))
    }

    /// One-line description, e.g. "Running: Timed | 2 min | Reveal + next".
    pub fn describe(&self) -> String {
        let mut details = vec![self.mode.label().to_string()];
        if self.mode.is_timed() {
            details.push(format!("{} min", self.minutes));
        }
        if self.mode.has_question_limit() {
            details.push(format!("{} questions", self.question_limit));
        }
        details.push(self.wrong_answer_policy.label().to_string());
        format!("Running: {}", details.join(" | "))
    }
}

/// Running tally of graded attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    /// Share of correct attempts in `0.0..=100.0`; zero before any attempt.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total) * 100.0
    }

    pub fn percent_text(&self) -> String {
        format!("{:.1}%", self.percent())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} ({})", self.correct, self.total, self.percent_text())
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// The player ended it.
    Stopped,
    /// The time limit ran out.
    TimeUp,
    /// The question limit was reached.
    GoalReached,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Stopped => write!(f, "Session ended."),
            EndReason::TimeUp => write!(f, "Time is up."),
            EndReason::GoalReached => write!(f, "Question goal reached."),
        }
    }
}

/// What the timer display should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerDisplay {
    /// Whole seconds left, rounded up.
    Remaining(u64),
    NoLimit,
}

impl TimerDisplay {
    /// Round a remaining duration up to whole seconds.
    pub fn from_remaining(remaining: Duration) -> Self {
        let millis = remaining.as_millis();
        let secs = millis.div_ceil(1000);
        TimerDisplay::Remaining(u64::try_from(secs).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for TimerDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerDisplay::Remaining(total) => write!(f, "{:02}:{:02}", total / 60, total % 60),
            TimerDisplay::NoLimit => write!(f, "No limit"),
        }
    }
}

/// Final report for a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub reason: EndReason,
    pub score: Score,
    pub percent: f64,
    pub completed_questions: u32,
    pub mode: SessionMode,
    pub wrong_answer_policy: WrongAnswerPolicy,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Final score: {}/{} ({}).",
            self.reason,
            self.score.correct,
            self.score.total,
            self.score.percent_text()
        )
    }
}
