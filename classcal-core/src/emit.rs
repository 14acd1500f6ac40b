//! Saving rendered exports.
//!
//! A file is written to a temporary sibling first and renamed into place, so
//! a failed save never leaves a half-written export or a stray temp file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ClassCalError, ClassCalResult};
use crate::export::ExportDocument;

/// Save `document` into `dir`, under `filename` or the document's default name.
///
/// Returns the path of the saved file.
pub fn save(
    document: &ExportDocument,
    dir: &Path,
    filename: Option<&str>,
) -> ClassCalResult<PathBuf> {
    let name = filename.unwrap_or(&document.filename);
    if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
        return Err(ClassCalError::InvalidFile {
            path: PathBuf::from(name),
            reason: "output filename must not contain directories".to_string(),
        });
    }

    std::fs::create_dir_all(dir)?;
    let target = dir.join(name);

    // Removed on drop unless persisted
    let mut tmp = tempfile::Builder::new()
        .prefix(".classcal-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(document.content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(&target).map_err(|e| ClassCalError::Io(e.error))?;

    debug!(
        path = %target.display(),
        mime = document.mime_type(),
        bytes = document.content.len(),
        "Saved export"
    );

    Ok(target)
}

/// Write `document` to any writer (e.g. stdout).
pub fn write_to<W: Write>(document: &ExportDocument, mut writer: W) -> ClassCalResult<()> {
    writer.write_all(document.content.as_bytes())?;
    if !document.content.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
