use anyhow::{Context, Result};
use classcal_core::export::{CalendarMetadata, ExportFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory exports are saved to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Override for the CSV file name (default: GoogleAgenda.csv)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_filename: Option<String>,

    /// Override for the ICS file name (default: ThunderbirdAgenda.ics)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_filename: Option<String>,

    /// Calendar-level properties of the ICS export
    #[serde(default)]
    pub calendar: CalendarMetadata,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            csv_filename: None,
            ics_filename: None,
            calendar: CalendarMetadata::default(),
        }
    }
}

impl Config {
    /// Configured file name for a format, if any
    pub fn filename_for(&self, format: ExportFormat) -> Option<&str> {
        match format {
            ExportFormat::Csv => self.csv_filename.as_deref(),
            ExportFormat::Ics => self.ics_filename.as_deref(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Get the config directory path (~/.config/classcal)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("classcal");
    Ok(config_dir)
}

/// Get the config file path (~/.config/classcal/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from ~/.config/classcal/config.toml, falling back to defaults
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
