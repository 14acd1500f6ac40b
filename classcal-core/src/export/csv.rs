//! Google Calendar CSV generation.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use chrono::{NaiveDate, NaiveDateTime};

use crate::entry::ScheduleEntry;
use crate::error::{ClassCalError, ClassCalResult};

/// Column layout expected by Google Calendar's CSV import
pub const HEADER: [&str; 9] = [
    "Subject",
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "All Day Event",
    "Description",
    "Location",
    "Private",
];

/// Generate the CSV document for every entry with a name and a start date.
///
/// Every cell is quoted, rows are joined with `\n` (no trailing newline).
pub fn generate_csv(entries: &[ScheduleEntry]) -> ClassCalResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;

    for entry in entries.iter().filter(|e| e.is_exportable()) {
        let fields = entry.fields();
        let start_date = format_google_date(&fields.start_date);
        let end_date = format_google_date(&fields.end_date);

        writer.write_record([
            fields.name.as_str(),
            start_date.as_str(),
            fields.start_time.as_str(),
            end_date.as_str(),
            fields.end_time.as_str(),
            "False",
            fields.description.as_str(),
            fields.location.as_str(),
            "True",
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ClassCalError::Csv(e.to_string()))?;
    let mut content = String::from_utf8(bytes).map_err(|e| ClassCalError::Csv(e.to_string()))?;

    if content.ends_with('\n') {
        content.pop();
    }

    Ok(content)
}

/// Render a normalized date as MM/DD/YYYY.
///
/// Text that is not a date is returned unchanged.
pub fn format_google_date(date: &str) -> String {
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.format("%m/%d/%Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%m/%d/%Y").to_string();
    }
    date.to_string()
}
