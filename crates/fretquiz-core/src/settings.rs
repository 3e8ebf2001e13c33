//! Settings file loading.
//!
//! Settings live in a TOML file with a single `[session]` table:
//!
//! ```toml
//! [session]
//! question_types = ["note-id", "find-note", "name-string"]
//! mode = "timed-questions"
//! minutes = 5
//! question_limit = 20
//! wrong_answer_policy = "retry-until-correct"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::question::QuestionKind;
use crate::session::{SessionConfig, SessionMode, WrongAnswerPolicy};

/// File name looked up in the current directory.
pub const LOCAL_SETTINGS_FILE: &str = "fretquiz.toml";

const DEFAULT_MINUTES: u32 = 2;
const DEFAULT_QUESTION_LIMIT: u32 = 30;

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FretquizConfig {
    #[serde(default)]
    pub session: SessionSettings,
}

/// The `[session]` table as written by the user.
///
/// Question types stay as strings here so unknown names can be reported by
/// [`validate_settings`] instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_question_types")]
    pub question_types: Vec<String>,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_limit: Option<u32>,
    #[serde(default)]
    pub wrong_answer_policy: WrongAnswerPolicy,
}

fn default_question_types() -> Vec<String> {
    QuestionKind::ALL.iter().map(ToString::to_string).collect()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            question_types: default_question_types(),
            mode: SessionMode::default(),
            minutes: None,
            question_limit: None,
            wrong_answer_policy: WrongAnswerPolicy::default(),
        }
    }
}

impl FretquizConfig {
    /// Build the engine configuration. Fails on unknown question types.
    pub fn to_session_config(&self) -> Result<SessionConfig> {
        let session = &self.session;
        Ok(SessionConfig {
            kinds: parse_kinds(&session.question_types)?,
            mode: session.mode,
            minutes: session.minutes.unwrap_or(DEFAULT_MINUTES),
            question_limit: session.question_limit.unwrap_or(DEFAULT_QUESTION_LIMIT),
            wrong_answer_policy: session.wrong_answer_policy,
        })
    }
}

/// Parse question type names such as `note-id` or `find`.
pub fn parse_kinds<S: AsRef<str>>(names: &[S]) -> Result<Vec<QuestionKind>> {
    names
        .iter()
        .map(|name| {
            name.as_ref()
                .parse::<QuestionKind>()
                .map_err(anyhow::Error::msg)
        })
        .collect()
}

/// Load settings from the default locations.
///
/// Search order:
/// 1. `fretquiz.toml` in the current directory
/// 2. `~/.config/fretquiz/config.toml`
///
/// Falls back to defaults when neither exists.
pub fn load_settings() -> Result<FretquizConfig> {
    load_settings_from(None)
}

/// Load settings from an explicit path, or search the default locations.
pub fn load_settings_from(path: Option<&Path>) -> Result<FretquizConfig> {
    let settings_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("settings file not found: {}", p.display());
            }
            Some(p.to_path_buf())
        }
        None => {
            let local = PathBuf::from(LOCAL_SETTINGS_FILE);
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    match settings_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            parse_settings_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))
        }
        None => Ok(FretquizConfig::default()),
    }
}

/// Parse settings from TOML text.
pub fn parse_settings_str(content: &str) -> Result<FretquizConfig> {
    toml::from_str(content).context("invalid settings TOML")
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("fretquiz"))
}

/// A non-fatal problem found in a settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The offending key.
    pub field: &'static str,
    pub message: String,
}

/// Check settings for common mistakes.
pub fn validate_settings(config: &FretquizConfig) -> Vec<ValidationWarning> {
    let session = &config.session;
    let mut warnings = Vec::new();

    if session.question_types.is_empty() {
        warnings.push(ValidationWarning {
            field: "question_types",
            message: "no question types selected; a session cannot start".into(),
        });
    }

    let mut seen = Vec::new();
    for name in &session.question_types {
        match name.parse::<QuestionKind>() {
            Ok(kind) if seen.contains(&kind) => warnings.push(ValidationWarning {
                field: "question_types",
                message: format!("duplicate question type: {name}"),
            }),
            Ok(kind) => seen.push(kind),
            Err(e) => warnings.push(ValidationWarning {
                field: "question_types",
                message: e,
            }),
        }
    }

    match session.minutes {
        Some(_) if !session.mode.is_timed() => warnings.push(ValidationWarning {
            field: "minutes",
            message: format!("minutes is ignored in {} mode", session.mode),
        }),
        Some(0) => warnings.push(ValidationWarning {
            field: "minutes",
            message: "minutes must be at least 1; using 1".into(),
        }),
        _ => {}
    }

    match session.question_limit {
        Some(_) if !session.mode.has_question_limit() => warnings.push(ValidationWarning {
            field: "question_limit",
            message: format!("question_limit is ignored in {} mode", session.mode),
        }),
        Some(0) => warnings.push(ValidationWarning {
            field: "question_limit",
            message: "question_limit must be at least 1; using 1".into(),
        }),
        _ => {}
    }

    warnings
}

/// Starter settings written by `fretquiz init`.
pub const SAMPLE_SETTINGS: &str = r#"# fretquiz settings

[session]
# Any of: note-id, find-note, name-string
question_types = ["note-id", "find-note", "name-string"]
# free, timed, questions, timed-questions
mode = "free"
# Used by timed modes
# minutes = 2
# Used by question-count modes
# question_limit = 30
# reveal-next or retry-until-correct
wrong_answer_policy = "reveal-next"
"#;
