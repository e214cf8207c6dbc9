//! CLI argument parsing for pm

use clap::Parser;
use std::path::PathBuf;

/// With no arguments, migrates the default exports into the database named by DATABASE_URL
#[derive(Parser, Debug)]
#[command(name = "pm")]
#[command(author, version, about = "Migrate legacy prenatal visits into consultasPrenatal", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Legacy patients CSV (overrides config)
    #[arg(long)]
    pub patients: Option<PathBuf>,

    /// Legacy visits CSV (overrides config)
    #[arg(long)]
    pub visits: Option<PathBuf>,

    /// Resolve and transform every row without clearing or inserting
    #[arg(long)]
    pub dry_run: bool,
}
