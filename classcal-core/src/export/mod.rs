//! Calendar export documents.
//!
//! Two formats are supported: the CSV layout Google Calendar imports and a
//! plain iCalendar file for Thunderbird and other RFC 5545 clients.

pub mod csv;
pub mod ics;

use std::fmt;

use chrono::Utc;
use tracing::debug;

use crate::entry::ScheduleEntry;
use crate::error::ClassCalResult;

pub use self::csv::generate_csv;
pub use self::ics::{generate_ics, CalendarMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Ics,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Ics];

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Ics => "text/calendar;charset=utf-8",
        }
    }

    pub fn default_filename(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "GoogleAgenda.csv",
            ExportFormat::Ics => "ThunderbirdAgenda.ics",
        }
    }

    /// Whether an entry makes it into this format.
    ///
    /// CSV tolerates missing times, calendar events need both bounds.
    pub fn accepts(&self, entry: &ScheduleEntry) -> bool {
        match self {
            ExportFormat::Csv => entry.is_exportable(),
            ExportFormat::Ics => entry.is_exportable() && entry.has_times(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Ics => write!(f, "ics"),
        }
    }
}

/// A rendered export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub format: ExportFormat,
    pub filename: String,
    pub content: String,
    /// Number of entries written into the document
    pub event_count: usize,
}

impl ExportDocument {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Render `entries` in the given format.
///
/// Returns `Ok(None)` when no entry qualifies for the format: there is
/// nothing to save and that is not an error.
pub fn render(
    format: ExportFormat,
    entries: &[ScheduleEntry],
    metadata: &CalendarMetadata,
) -> ClassCalResult<Option<ExportDocument>> {
    let event_count = entries.iter().filter(|e| format.accepts(e)).count();
    if event_count == 0 {
        debug!(%format, "No entries to export");
        return Ok(None);
    }

    let content = match format {
        ExportFormat::Csv => generate_csv(entries)?,
        ExportFormat::Ics => generate_ics(entries, metadata, Utc::now()),
    };

    Ok(Some(ExportDocument {
        format,
        filename: format.default_filename().to_string(),
        content,
        event_count,
    }))
}
