//! The `fretquiz play` command.
//!
//! Hosts a [`QuizEngine`] on a single-threaded event loop. Input lines,
//! timer ticks, and deferred next-question tickets are handled one at a
//! time, so the engine never sees overlapping events.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fretquiz_core::engine::{AdvanceTicket, TIMER_TICK};
use fretquiz_core::note::{Fret, GuitarString, Position};
use fretquiz_core::session::TimerDisplay;
use fretquiz_core::settings::load_settings_from;
use fretquiz_core::traits::{BoardHit, FeedbackKind, HitKind, Presenter, StringChoiceFeedback};
use fretquiz_core::{
    EndReason, Question, QuestionKind, QuizEngine, Resolution, Score, SessionConfig, SessionMode,
    SessionSummary, SubmitOutcome, WrongAnswerPolicy, NEXT_QUESTION_DELAY,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub types: Option<Vec<QuestionKind>>,
    pub mode: Option<SessionMode>,
    pub minutes: Option<u32>,
    pub limit: Option<u32>,
    pub wrong_answer: Option<WrongAnswerPolicy>,
}

impl Overrides {
    fn apply(self, config: &mut SessionConfig) {
        if let Some(types) = self.types {
            config.kinds = types;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(minutes) = self.minutes {
            config.minutes = minutes;
        }
        if let Some(limit) = self.limit {
            config.question_limit = limit;
        }
        if let Some(policy) = self.wrong_answer {
            config.wrong_answer_policy = policy;
        }
    }
}

pub async fn execute(
    overrides: Overrides,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let settings = load_settings_from(config_path.as_deref())?;
    let mut config = settings.to_session_config()?;
    overrides.apply(&mut config);

    let mut engine = match seed {
        Some(seed) => QuizEngine::seeded(seed),
        None => QuizEngine::new(),
    };

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    // With --json the quiz itself moves to stderr so stdout stays parseable.
    let mut out: Box<dyn Write> = if json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };

    let summary = run_session(&mut engine, &config, input, &mut out).await?;

    if json {
        if let Some(summary) = summary {
            let text =
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
            println!("{text}");
        }
    }
    Ok(())
}

/// Drive one session until it ends. Closing `input` ends the session.
pub async fn run_session<I, W>(
    engine: &mut QuizEngine,
    config: &SessionConfig,
    input: I,
    out: &mut W,
) -> Result<Option<SessionSummary>>
where
    I: AsyncBufRead + Unpin,
    W: Write + ?Sized,
{
    let mut presenter = TerminalPresenter::default();
    let (advance_tx, mut advance_rx) = mpsc::unbounded_channel::<AdvanceTicket>();
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(TIMER_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = engine.start(config, now(), &mut presenter);
    presenter.flush(out)?;
    started.context("session did not start")?;
    presenter.print_help();
    presenter.flush(out)?;

    while engine.is_active() {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("failed to read input")? {
                    Some(line) => handle_line(engine, &line, &mut presenter, &advance_tx),
                    None => {
                        tracing::debug!("input closed");
                        engine.end(EndReason::Stopped, &mut presenter);
                    }
                }
            }
            _ = ticker.tick(), if engine.timer_armed() => {
                engine.tick(now(), &mut presenter);
            }
            Some(ticket) = advance_rx.recv() => {
                engine.advance(ticket, &mut presenter);
            }
        }
        presenter.flush(out)?;
    }

    Ok(engine.summary().cloned())
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

fn handle_line(
    engine: &mut QuizEngine,
    line: &str,
    presenter: &mut TerminalPresenter,
    advance_tx: &mpsc::UnboundedSender<AdvanceTicket>,
) {
    let outcome = match parse_command(line) {
        Command::Empty => return,
        Command::Quit => {
            engine.end(EndReason::Stopped, presenter);
            return;
        }
        Command::Invalid(message) => {
            presenter.render_feedback(&message, FeedbackKind::Bad);
            return;
        }
        Command::Click(position) => engine.submit_board_click(position, presenter),
        Command::Text(text) => match engine.current_question().map(Question::kind) {
            Some(QuestionKind::NameString) => engine.submit_string_letter(&text, None, presenter),
            _ => engine.submit_typed_answer(&text, presenter),
        },
    };

    match outcome {
        SubmitOutcome::Ignored if engine.is_active() => {
            let hint = match engine.current_question().map(Question::kind) {
                _ if engine.is_locked() => "Wait for the next question.",
                Some(QuestionKind::FindNote) => "Pick a position: <string number> <fret>, e.g. 6 3.",
                Some(QuestionKind::NoteId) => "Type a note name.",
                Some(QuestionKind::NameString) | None => "Type a string letter.",
            };
            presenter.line(hint.to_string());
        }
        SubmitOutcome::Correct(Resolution::Next(ticket))
        | SubmitOutcome::Incorrect(Resolution::Next(ticket)) => {
            let tx = advance_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(NEXT_QUESTION_DELAY).await;
                // The receiver is gone once the session loop has returned.
                let _ = tx.send(ticket);
            });
        }
        _ => {}
    }
}

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Empty,
    Quit,
    /// A fretboard position typed as `<string number> <fret>`.
    Click(Position),
    /// A note name or string letter, passed to the engine as typed.
    Text(String),
    Invalid(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if matches!(trimmed.to_lowercase().as_str(), "quit" | "end" | "q") {
        return Command::Quit;
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if let [string, fret] = parts.as_slice() {
        if let (Ok(string), Ok(fret)) = (string.parse::<u8>(), fret.parse::<u8>()) {
            let Some(string) = GuitarString::from_number(string) else {
                return Command::Invalid("String numbers run from 1 (high E) to 6 (low E).".into());
            };
            let Some(fret) = Fret::new(fret) else {
                return Command::Invalid(format!("Frets run from 0 to {}.", Fret::MAX));
            };
            return Command::Click(Position::new(string, fret));
        }
    }

    Command::Text(trimmed.to_string())
}

/// Presenter that queues plain-text lines for the terminal.
#[derive(Default)]
struct TerminalPresenter {
    pending: Vec<String>,
    last_timer: Option<TimerDisplay>,
}

impl TerminalPresenter {
    fn line(&mut self, text: String) {
        self.pending.push(text);
    }

    fn flush<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<()> {
        for line in self.pending.drain(..) {
            writeln!(out, "{line}").context("failed to write output")?;
        }
        out.flush().context("failed to write output")
    }

    fn print_help(&mut self) {
        self.line(
            "Answer with a note name (F#, Bb), a string letter (E A D G B), \
             or a position as <string number> <fret>. Type quit to end."
                .to_string(),
        );
    }
}

fn describe(position: Position) -> String {
    format!("{}, fret {}", position.string, position.fret)
}

impl Presenter for TerminalPresenter {
    fn render_question(&mut self, question: &Question) {
        self.line(String::new());
        self.line(format!("> {}", question.prompt()));
    }

    fn render_board_marker(&mut self, marker: Option<Position>) {
        if let Some(position) = marker {
            self.line(format!("  [marked: {}]", describe(position)));
        }
    }

    fn render_feedback(&mut self, message: &str, kind: FeedbackKind) {
        match kind {
            FeedbackKind::Neutral if message.is_empty() => {}
            FeedbackKind::Good => self.line(format!("+ {message}")),
            FeedbackKind::Bad => self.line(format!("- {message}")),
            FeedbackKind::Neutral => self.line(message.to_string()),
        }
    }

    fn render_score(&mut self, score: &Score) {
        if score.total > 0 {
            self.line(format!("  Score: {score}"));
        }
    }

    fn render_timer(&mut self, timer: TimerDisplay) {
        if self.last_timer == Some(timer) {
            return;
        }
        let first = self.last_timer.is_none();
        self.last_timer = Some(timer);
        let show = match timer {
            TimerDisplay::NoLimit => first,
            TimerDisplay::Remaining(secs) => first || secs <= 10 || secs % 30 == 0,
        };
        if show {
            self.line(format!("  Time: {timer}"));
        }
    }

    fn render_session_summary(&mut self, summary: &str) {
        self.last_timer = None;
        self.line(String::new());
        self.line(summary.to_string());
    }

    fn render_session_info(&mut self, info: &str) {
        self.line(info.to_string());
    }

    fn render_board_hits(&mut self, hits: &[BoardHit]) {
        for hit in hits {
            if hit.kind == HitKind::Correct {
                self.line(format!("  answer: {}", describe(hit.position)));
            }
        }
    }

    fn render_string_choices(&mut self, feedback: &StringChoiceFeedback) {
        if feedback.revealed.is_none() && !feedback.wrong.is_empty() {
            let tried: Vec<String> = feedback.wrong.iter().map(ToString::to_string).collect();
            self.line(format!("  tried: {}", tried.join(", ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;

    use super::*;

    fn position(number: u8, fret: u8) -> Position {
        Position::new(
            GuitarString::from_number(number).unwrap(),
            Fret::new(fret).unwrap(),
        )
    }

    #[test]
    fn parse_quit_and_blank_lines() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command(" END "), Command::Quit);
    }

    #[test]
    fn parse_positions() {
        assert_eq!(parse_command("6 3"), Command::Click(position(6, 3)));
        assert_eq!(parse_command(" 1  0 "), Command::Click(position(1, 0)));
        assert!(matches!(parse_command("7 3"), Command::Invalid(_)));
        assert!(matches!(parse_command("6 13"), Command::Invalid(_)));
    }

    #[test]
    fn parse_text_answers() {
        assert_eq!(parse_command("F#"), Command::Text("F#".into()));
        assert_eq!(parse_command(" b flat "), Command::Text("b flat".into()));
        assert_eq!(parse_command("a"), Command::Text("a".into()));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = SessionConfig::default();
        Overrides {
            types: Some(vec![QuestionKind::FindNote]),
            mode: Some(SessionMode::Questions),
            limit: Some(5),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.kinds, vec![QuestionKind::FindNote]);
        assert_eq!(config.mode, SessionMode::Questions);
        assert_eq!(config.question_limit, 5);
        assert_eq!(config.minutes, 2);
    }

    #[test]
    fn timer_lines_are_throttled() {
        let mut presenter = TerminalPresenter::default();
        for secs in (0..=65).rev() {
            presenter.render_timer(TimerDisplay::Remaining(secs));
            presenter.render_timer(TimerDisplay::Remaining(secs));
        }
        let shown: Vec<_> = presenter.pending.iter().map(String::as_str).collect();
        assert_eq!(shown.first(), Some(&"  Time: 01:05"));
        assert!(shown.contains(&"  Time: 01:00"));
        assert!(shown.contains(&"  Time: 00:30"));
        assert!(!shown.contains(&"  Time: 00:45"));
        // 65, 60, 30, then 10 down to 0.
        assert_eq!(shown.len(), 3 + 11);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_ends_the_session() {
        let mut engine = QuizEngine::seeded(1);
        let mut out = Vec::new();
        let summary = run_session(&mut engine, &SessionConfig::default(), &b""[..], &mut out)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.reason, EndReason::Stopped);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Session ended. Final score: 0/0 (0.0%)."));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_question_types_fail_to_start() {
        let mut engine = QuizEngine::seeded(1);
        let mut out = Vec::new();
        let config = SessionConfig {
            kinds: vec![],
            ..Default::default()
        };
        let err = run_session(&mut engine, &config, &b"C\n"[..], &mut out)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Select at least one question type"));
        assert!(!engine.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn question_limit_ends_the_session() {
        let mut engine = QuizEngine::seeded(2);
        let mut out = Vec::new();
        let config = SessionConfig {
            kinds: vec![QuestionKind::NoteId],
            mode: SessionMode::Questions,
            question_limit: 1,
            ..Default::default()
        };
        let summary = run_session(&mut engine, &config, &b"C\nD\n"[..], &mut out)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.reason, EndReason::GoalReached);
        assert_eq!(summary.completed_questions, 1);
        assert_eq!(summary.score.total, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_session_expires_while_waiting_for_input() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut engine = QuizEngine::seeded(3);
        let mut out = Vec::new();
        let config = SessionConfig {
            mode: SessionMode::Timed,
            minutes: 1,
            ..Default::default()
        };
        let summary = run_session(
            &mut engine,
            &config,
            tokio::io::BufReader::new(reader),
            &mut out,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(summary.reason, EndReason::TimeUp);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Time: 01:00"));
        assert!(text.contains("Time: 00:01"));
        assert!(text.contains("Time is up. Final score: 0/0 (0.0%)."));
    }

    #[tokio::test(start_paused = true)]
    async fn next_question_follows_the_delay() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let mut engine = QuizEngine::seeded(4);
        let mut out = Vec::new();
        let config = SessionConfig {
            kinds: vec![QuestionKind::NoteId],
            ..Default::default()
        };

        let player = tokio::spawn(async move {
            writer.write_all(b"C\n").await.unwrap();
            // Typed while the feedback is still showing.
            tokio::time::sleep(Duration::from_millis(100)).await;
            writer.write_all(b"D\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            writer.write_all(b"quit\n").await.unwrap();
            writer
        });

        let summary = run_session(
            &mut engine,
            &config,
            tokio::io::BufReader::new(reader),
            &mut out,
        )
        .await
        .unwrap()
        .unwrap();
        drop(player.await.unwrap());

        assert_eq!(summary.reason, EndReason::Stopped);
        assert_eq!(summary.score.total, 1);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Name the note at the marked position.").count(), 2);
        assert!(text.contains("Wait for the next question."));
    }
}
