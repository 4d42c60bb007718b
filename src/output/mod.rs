//! Output sinks for recovered players and the run summary.

pub mod csv;
pub mod jsonl;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::parser::{ParseResult, ParseStats};
use crate::record::ParsedPlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBackendKind {
    Jsonl,
    Csv,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Provenance stamped on every output row.
#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
    pub run_id: String,
    pub tool_version: String,
    pub config_hash: String,
    pub input_path: String,
    pub input_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    #[serde(flatten)]
    pub context: &'a RunContext,
    pub success: bool,
    pub format: &'static str,
    pub players_found: usize,
    pub total_chunks: usize,
    pub medium_chunks: usize,
    pub error: Option<&'a str>,
    pub stats: &'a ParseStats,
}

impl<'a> RunSummary<'a> {
    pub fn new(context: &'a RunContext, result: &'a ParseResult) -> Self {
        Self {
            context,
            success: result.success,
            format: result.format.as_str(),
            players_found: result.players.len(),
            total_chunks: result.total_chunks,
            medium_chunks: result.medium_chunks,
            error: result.error.as_deref(),
            stats: &result.stats,
        }
    }
}

pub trait PlayerSink {
    fn record_player(&mut self, player: &ParsedPlayer) -> Result<(), OutputError>;
    fn flush(&mut self) -> Result<(), OutputError>;
}

pub fn build_sink(
    backend: OutputBackendKind,
    context: &RunContext,
    run_output_dir: &Path,
) -> Result<Box<dyn PlayerSink>, OutputError> {
    std::fs::create_dir_all(run_output_dir)?;
    match backend {
        OutputBackendKind::Jsonl => Ok(Box::new(jsonl::JsonlSink::new(context, run_output_dir)?)),
        OutputBackendKind::Csv => Ok(Box::new(csv::CsvSink::new(context, run_output_dir)?)),
    }
}

/// Writes every player of `result` to `sink` and flushes it.
pub fn write_players(sink: &mut dyn PlayerSink, result: &ParseResult) -> Result<usize, OutputError> {
    for player in &result.players {
        sink.record_player(player)?;
    }
    sink.flush()?;
    Ok(result.players.len())
}

pub fn write_summary(
    run_output_dir: &Path,
    summary: &RunSummary<'_>,
) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(run_output_dir)?;
    let path = run_output_dir.join("run_summary.json");
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(path)
}
