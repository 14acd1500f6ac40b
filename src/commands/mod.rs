pub mod analyze;
pub mod config;
pub mod export;

use std::path::Path;

use anyhow::{Context, Result};
use classcal_core::schedule::Schedule;
use owo_colors::OwoColorize;

/// Load a schedule file, noting records that could not be read.
pub fn load_schedule(file: &Path) -> Result<Schedule> {
    let schedule = Schedule::load(file)
        .with_context(|| format!("Failed to read schedule from {}", file.display()))?;

    let skipped = schedule.raw_count - schedule.entries.len();
    if skipped > 0 {
        eprintln!(
            "{}",
            format!("Skipped {} unreadable record(s)", skipped).yellow()
        );
    }

    Ok(schedule)
}
