use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jsonl,
    Csv,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Squad export to decode
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for recovered players and the run summary
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Player output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Log progress snapshots while parsing
    #[arg(long)]
    pub progress: bool,

    /// Skip the byte-by-byte full-file fallback scan
    #[arg(long)]
    pub no_full_scan: bool,

    /// Override the density scan's minimum plausible records per window
    #[arg(long)]
    pub min_probe_hits: Option<usize>,

    /// Override the marker scan's minimum delimiter count per window
    #[arg(long)]
    pub min_marker_hits: Option<usize>,

    /// Provide input SHA-256 (hex) for the run summary
    #[arg(long)]
    pub input_sha256: Option<String>,

    /// Compute input SHA-256 for the run summary
    #[arg(long)]
    pub compute_input_sha256: bool,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
