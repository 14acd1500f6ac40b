use std::path::{Path, PathBuf};

use anyhow::Result;
use classcal_core::{emit, export, ExportDocument, ExportFormat, ScheduleEntry};
use owo_colors::OwoColorize;
use tracing::debug;

use super::load_schedule;
use crate::config::{self, Config};

/// Destination given by `--output -`
const STDOUT: &str = "-";

pub fn run(
    file: &Path,
    formats: &[ExportFormat],
    output: Option<&str>,
    filename: Option<&str>,
) -> Result<()> {
    let to_stdout = output == Some(STDOUT);

    if formats.len() > 1 && (filename.is_some() || to_stdout) {
        anyhow::bail!(
            "--filename and --output - need a single format.\n\
            Use --format csv or --format ics"
        );
    }

    let cfg = config::load_config()?;
    let schedule = load_schedule(file)?;

    if to_stdout {
        debug!("Writing exports to stdout");
        for document in render_all(&cfg, &schedule.entries, formats)? {
            emit::write_to(&document, std::io::stdout().lock())?;
        }
        return Ok(());
    }

    let out_dir = config::expand_path(output.unwrap_or(&cfg.output_dir));
    debug!(dir = %out_dir.display(), from_flag = output.is_some(), "Output directory");
    save_all(&cfg, &schedule.entries, formats, &out_dir, filename)?;

    Ok(())
}

/// Render every requested format, reporting the ones with nothing to export.
fn render_all(
    cfg: &Config,
    entries: &[ScheduleEntry],
    formats: &[ExportFormat],
) -> Result<Vec<ExportDocument>> {
    let mut documents = Vec::new();

    for &format in formats {
        match export::render(format, entries, &cfg.calendar)? {
            Some(document) => documents.push(document),
            None => eprintln!(
                "{}",
                format!("No {} events to export, nothing saved", label(format)).dimmed()
            ),
        }
    }

    Ok(documents)
}

/// Save each rendered format into `out_dir` and return the saved paths.
fn save_all(
    cfg: &Config,
    entries: &[ScheduleEntry],
    formats: &[ExportFormat],
    out_dir: &Path,
    filename: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let mut saved = Vec::new();

    for document in render_all(cfg, entries, formats)? {
        let name = filename.or_else(|| cfg.filename_for(document.format));
        debug!(
            format = %document.format,
            name = name.unwrap_or(document.filename.as_str()),
            "Export file name"
        );
        let path = emit::save(&document, out_dir, name)?;

        println!(
            "{} {} {} → {}",
            "✓".green(),
            label(document.format).bold(),
            format!(
                "({} {})",
                document.event_count,
                pluralize("event", document.event_count)
            )
            .dimmed(),
            path.display()
        );

        saved.push(path);
    }

    Ok(saved)
}

fn label(format: ExportFormat) -> String {
    format.to_string().to_uppercase()
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
