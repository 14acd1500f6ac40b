//! Schedule entries and the fields derived from them.
//!
//! A `ScheduleEntry` is one class session as it appears in the student's
//! export. Every field is optional; `EntryFields` is the normalized view that
//! both export formats read from, so they agree on what "present" means.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Midnight marker the export appends to plain dates.
const MIDNIGHT_SUFFIX: &str = "T00:00:00";

/// A single class session from the schedule export.
///
/// A field is `Some` only when its key exists, is not `null` and is not an
/// empty string. Numbers and booleans are kept as their text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "NOME", default, deserialize_with = "text_field")]
    pub name: Option<String>,
    #[serde(rename = "DATAINICIAL", default, deserialize_with = "text_field")]
    pub start_date: Option<String>,
    #[serde(rename = "DATAFINAL", default, deserialize_with = "text_field")]
    pub end_date: Option<String>,
    #[serde(rename = "HORAINICIAL", default, deserialize_with = "text_field")]
    pub start_time: Option<String>,
    #[serde(rename = "HORAFINAL", default, deserialize_with = "text_field")]
    pub end_time: Option<String>,

    // Location parts
    #[serde(rename = "PREDIO", default, deserialize_with = "text_field")]
    pub building: Option<String>,
    #[serde(rename = "BLOCO", default, deserialize_with = "text_field")]
    pub block: Option<String>,
    #[serde(rename = "SALA", default, deserialize_with = "text_field")]
    pub room: Option<String>,

    // Description parts
    #[serde(rename = "CODTURMA", default, deserialize_with = "text_field")]
    pub class_code: Option<String>,
    #[serde(rename = "CODSUBTURMA", default, deserialize_with = "text_field")]
    pub sub_class_code: Option<String>,
    #[serde(rename = "NOMEREDUZIDO", default, deserialize_with = "text_field")]
    pub short_name: Option<String>,
    #[serde(rename = "URLAULAONLINE", default, deserialize_with = "text_field")]
    pub online_class_url: Option<String>,

    /// Day of week, "0" (Sunday) to "6" (Saturday)
    #[serde(rename = "DIASEMANA", default, deserialize_with = "text_field")]
    pub weekday: Option<String>,
}

/// Normalized, display-ready view of a `ScheduleEntry`.
///
/// Absent optional fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub description: String,
}

impl ScheduleEntry {
    /// Entries without a name or a start date never reach any export.
    pub fn is_exportable(&self) -> bool {
        self.name.is_some() && self.start_date.is_some()
    }

    /// Both time bounds are present (required for calendar events).
    pub fn has_times(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    /// Start date with the midnight marker removed
    pub fn normalized_start_date(&self) -> Option<&str> {
        self.start_date.as_deref().map(normalize_date)
    }

    /// End date with the midnight marker removed, falling back to the start date
    pub fn normalized_end_date(&self) -> Option<&str> {
        self.end_date
            .as_deref()
            .or(self.start_date.as_deref())
            .map(normalize_date)
    }

    /// Building, block and room joined with " - ", in that order.
    pub fn location(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(building) = &self.building {
            parts.push(building.clone());
        }
        if let Some(block) = &self.block {
            parts.push(format!("Bloco: {}", block));
        }
        if let Some(room) = &self.room {
            parts.push(format!("Sala: {}", room));
        }
        parts.join(" - ")
    }

    /// Class code, sub-class code, short name and online URL joined with " | ".
    pub fn description(&self) -> String {
        let labelled = [
            ("Turma", &self.class_code),
            ("Subturma", &self.sub_class_code),
            ("Código", &self.short_name),
            ("Aula Online", &self.online_class_url),
        ];

        labelled
            .into_iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Build the normalized view. Never fails.
    pub fn fields(&self) -> EntryFields {
        EntryFields {
            name: self.name.clone().unwrap_or_default(),
            start_date: self.normalized_start_date().unwrap_or_default().to_string(),
            end_date: self.normalized_end_date().unwrap_or_default().to_string(),
            start_time: self.start_time.clone().unwrap_or_default(),
            end_time: self.end_time.clone().unwrap_or_default(),
            location: self.location(),
            description: self.description(),
        }
    }
}

/// Strip a trailing `T00:00:00`, leaving a plain calendar date.
pub fn normalize_date(raw: &str) -> &str {
    raw.strip_suffix(MIDNIGHT_SUFFIX).unwrap_or(raw)
}

/// Accept strings and scalars; map `null` and "" to `None`.
fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a text value, found {}",
            other
        ))),
    }
}
