//! Reading a schedule export from disk.
//!
//! The export is a JSON document with the entries nested at
//! `data.SHorarioAluno`. The file is checked before it is parsed, and the
//! structure is checked before any entry is read. Individual entries that
//! cannot be read are dropped with a warning instead of failing the file.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::entry::ScheduleEntry;
use crate::error::{ClassCalError, ClassCalResult};

/// Largest schedule file accepted (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const DATA_KEY: &str = "data";
const ENTRIES_KEY: &str = "SHorarioAluno";

/// Entries read from a schedule file.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    /// Number of raw records in the file, including the ones that were dropped
    pub raw_count: usize,
}

impl Schedule {
    /// Load and validate a schedule file.
    pub fn load(path: &Path) -> ClassCalResult<Self> {
        validate_file(path)?;

        // Bytes, so invalid UTF-8 is reported as malformed JSON
        let content = std::fs::read(path)?;
        Self::from_json(&content)
    }

    /// Parse schedule JSON.
    pub fn from_json(content: &[u8]) -> ClassCalResult<Self> {
        let raw: Value = serde_json::from_slice(content)?;
        Self::from_value(raw)
    }

    /// Extract entries from an already parsed document.
    pub fn from_value(raw: Value) -> ClassCalResult<Self> {
        let records = extract_records(raw)?;
        let raw_count = records.len();

        let entries: Vec<ScheduleEntry> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable schedule entry");
                    None
                }
            })
            .collect();

        info!("Validated {} of {} entries", entries.len(), raw_count);

        Ok(Schedule { entries, raw_count })
    }
}

/// Reject files that are obviously not schedule exports before reading them.
pub fn validate_file(path: &Path) -> ClassCalResult<()> {
    let invalid = |reason: &str| ClassCalError::InvalidFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(invalid("unsupported file type, only .json files are accepted"));
    }

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(invalid("not a regular file"));
    }
    if metadata.len() > MAX_FILE_SIZE {
        return Err(invalid("file is larger than the 10MB limit"));
    }

    Ok(())
}

/// Walk `data.SHorarioAluno` and hand back the raw records.
fn extract_records(raw: Value) -> ClassCalResult<Vec<Value>> {
    let Value::Object(mut root) = raw else {
        return Err(ClassCalError::Validation(
            "top-level value must be an object".into(),
        ));
    };

    let data = root
        .remove(DATA_KEY)
        .ok_or_else(|| ClassCalError::Validation(format!("missing '{}' key", DATA_KEY)))?;

    let Value::Object(mut data) = data else {
        return Err(ClassCalError::Validation(format!(
            "'{}' must be an object",
            DATA_KEY
        )));
    };

    match data.remove(ENTRIES_KEY) {
        Some(Value::Array(records)) => Ok(records),
        Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(ClassCalError::Validation(format!(
            "'{}' must be a list",
            ENTRIES_KEY
        ))),
        None => Err(ClassCalError::Validation(format!(
            "missing '{}' key",
            ENTRIES_KEY
        ))),
    }
}
