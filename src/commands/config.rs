use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config;

pub fn run() -> Result<()> {
    let config_path = config::config_path()?;
    let cfg = config::load_config()?;

    println!("{}", "Paths".bold());
    let status = if config_path.exists() {
        "".to_string()
    } else {
        " (not found, using defaults)".dimmed().to_string()
    };
    println!("  Config:     {}{}", config_path.display(), status);
    println!("  Output:     {}", config::expand_path(&cfg.output_dir).display());

    println!();
    println!("{}", "Settings".bold());
    print!("{}", toml::to_string_pretty(&cfg)?);

    Ok(())
}
