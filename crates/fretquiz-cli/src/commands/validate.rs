//! The `fretquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;
use fretquiz_core::settings::{load_settings_from, validate_settings};

pub fn execute(config_path: PathBuf) -> Result<()> {
    let config = load_settings_from(Some(&config_path))?;
    let session = &config.session;
    println!(
        "Settings: {} ({} question type(s), {})",
        config_path.display(),
        session.question_types.len(),
        session.mode
    );

    let warnings = validate_settings(&config);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.field, w.message);
    }

    if warnings.is_empty() {
        println!("Settings valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
