//! The `fretquiz init` command.

use std::path::Path;

use anyhow::{Context, Result};
use fretquiz_core::settings::{LOCAL_SETTINGS_FILE, SAMPLE_SETTINGS};

pub fn execute() -> Result<()> {
    let path = Path::new(LOCAL_SETTINGS_FILE);
    if path.exists() {
        println!("{LOCAL_SETTINGS_FILE} already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_SETTINGS)
            .with_context(|| format!("failed to write {LOCAL_SETTINGS_FILE}"))?;
        println!("Created {LOCAL_SETTINGS_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Edit {LOCAL_SETTINGS_FILE} to pick question types and a session mode");
    println!("  2. Run: fretquiz validate --config {LOCAL_SETTINGS_FILE}");
    println!("  3. Run: fretquiz play");

    Ok(())
}
