use std::path::Path;

use anyhow::Result;
use classcal_core::analysis;

use super::load_schedule;
use crate::render::Render;

pub fn run(file: &Path, json: bool) -> Result<()> {
    let schedule = load_schedule(file)?;
    let analysis = analysis::analyze(&schedule.entries);

    if !analysis.has_valid_entries() {
        anyhow::bail!(
            "No valid entries found in {}.\n\
            Entries need at least NOME and DATAINICIAL.",
            file.display()
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", analysis.render());
    }

    Ok(())
}
