mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use classcal_core::ExportFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classcal")]
#[command(about = "Turn a class schedule export into Google Calendar CSV and iCalendar files")]
struct Cli {
    /// Log what is being read and skipped
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the schedule as CSV (Google Calendar) and/or ICS (Thunderbird)
    Export {
        /// Schedule JSON export (e.g. QuadroHorarioAluno.json)
        file: PathBuf,

        /// Which file(s) to produce
        #[arg(short, long, value_enum, default_value_t = FormatArg::All)]
        format: FormatArg,

        /// Output directory, or "-" for stdout (defaults to output_dir from config)
        #[arg(short, long)]
        output: Option<String>,

        /// File name to save as (single format only)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Show statistics about the schedule
    Analyze {
        /// Schedule JSON export
        file: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show config location and effective settings
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Ics,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Csv => vec![ExportFormat::Csv],
            FormatArg::Ics => vec![ExportFormat::Ics],
            FormatArg::All => ExportFormat::ALL.to_vec(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Export {
            file,
            format,
            output,
            filename,
        } => commands::export::run(
            &file,
            &format.formats(),
            output.as_deref(),
            filename.as_deref(),
        ),
        Commands::Analyze { file, json } => commands::analyze::run(&file, json),
        Commands::Config => commands::config::run(),
    }
}

/// Logs go to stderr so `--output -` keeps stdout clean.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
