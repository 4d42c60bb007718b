//! # Parser
//!
//! Drives one parse call over an in-memory container:
//! signature check, chunk discovery (directory, then heuristics when the
//! directory is thin), per-chunk extraction in size-class priority order,
//! the full-file fallback when nothing was found, and deduplication.
//!
//! Every call builds its own decoder, extractor and accumulators; nothing is
//! shared between calls and the input buffer is never modified.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chunk::{ChunkSizeClass, processing_order};
use crate::config::ScanConfig;
use crate::dedup::dedup_players;
use crate::directory::ChunkDirectoryReader;
use crate::evidence::{self, EvidenceError};
use crate::extract::{RecordExtractor, RecordReader};
use crate::format::{self, ContainerFormat};
use crate::fullscan::FullFileScanner;
use crate::heuristic::HeuristicChunkScanner;
use crate::progress::{ParseStage, ProgressReporter, ProgressTracker};
use crate::record::ParsedPlayer;

/// Chunks processed between extraction progress snapshots.
const PROGRESS_BATCH: usize = 10;
const EXTRACT_START_PCT: u8 = 25;
const EXTRACT_END_PCT: u8 = 85;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input is not an fbchunks container")]
    FormatMismatch,
    #[error(
        "no player records found ({total_chunks} chunks, {skipped_compressed} compressed chunks skipped, {bytes_scanned} bytes scanned)"
    )]
    NoRecordsFound {
        total_chunks: usize,
        skipped_compressed: usize,
        bytes_scanned: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub header_version: Option<u32>,
    pub directory_entries: usize,
    pub heuristic_chunks: usize,
    pub skipped_compressed: usize,
    pub skipped_tiny: usize,
    /// Records accepted before deduplication.
    pub candidates: usize,
    pub duplicates_removed: usize,
    pub used_full_scan: bool,
    pub bytes_scanned: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub success: bool,
    pub format: ContainerFormat,
    pub players: Vec<ParsedPlayer>,
    pub total_chunks: usize,
    pub medium_chunks: usize,
    pub error: Option<String>,
    pub stats: ParseStats,
}

impl ParseResult {
    fn failed(format: ContainerFormat, err: &ParseError, stats: ParseStats) -> Self {
        Self {
            success: false,
            format,
            players: Vec::new(),
            total_chunks: 0,
            medium_chunks: 0,
            error: Some(err.to_string()),
            stats,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SquadParser {
    cfg: ScanConfig,
}

impl SquadParser {
    pub fn new(cfg: ScanConfig) -> Self {
        Self { cfg }
    }

    /// Loads `path` into memory and parses it.
    pub fn parse_path(
        &self,
        path: &Path,
        observer: Option<&dyn ProgressReporter>,
    ) -> Result<ParseResult, EvidenceError> {
        let data = evidence::load_input(path)?;
        Ok(self.parse(&data, observer))
    }

    pub fn parse(&self, data: &[u8], observer: Option<&dyn ProgressReporter>) -> ParseResult {
        let mut progress = ProgressTracker::new(observer);
        progress.emit(
            ParseStage::Reading,
            5,
            format!("{} bytes loaded", data.len()),
        );

        let Some(header) = format::sniff_header(data) else {
            let err = ParseError::FormatMismatch;
            warn!("{err}");
            progress.emit(ParseStage::Failed, 100, err.to_string());
            return ParseResult::failed(ContainerFormat::Unknown, &err, ParseStats::default());
        };
        debug!("fbchunks header version={}", header.version);

        let mut stats = ParseStats {
            header_version: Some(header.version),
            ..ParseStats::default()
        };

        let scanner = HeuristicChunkScanner::new(&self.cfg);
        let layout = ChunkDirectoryReader::new(&self.cfg).locate_chunks(data, &scanner);
        stats.directory_entries = layout.directory_entries;
        stats.heuristic_chunks = layout.heuristic_chunks;

        let chunks = layout.chunks;
        let medium_chunks = chunks
            .iter()
            .filter(|chunk| chunk.size_class() == ChunkSizeClass::Medium)
            .count();
        progress.total_chunks = chunks.len();
        progress.emit(
            ParseStage::Directory,
            15,
            format!("{} directory entries accepted", stats.directory_entries),
        );
        progress.emit(
            ParseStage::Scanning,
            EXTRACT_START_PCT,
            format!("{} heuristic chunks merged", stats.heuristic_chunks),
        );

        let reader = RecordReader::default();
        let extractor = RecordExtractor::default();
        let mut candidates: Vec<ParsedPlayer> = Vec::new();

        for chunk in processing_order(&chunks) {
            if !chunk.is_readable() {
                if chunk.is_compressed {
                    stats.skipped_compressed += 1;
                    debug!(
                        "chunk {} at {:#x} is compressed ({} bytes), skipping",
                        chunk.index,
                        chunk.offset,
                        chunk.effective_size()
                    );
                } else {
                    stats.skipped_tiny += 1;
                }
            } else if let Some(bytes) = chunk.bytes(data) {
                let extraction = extractor.extract(bytes, chunk.offset, &reader);
                stats.bytes_scanned += bytes.len() as u64;
                if let Some(strategy) = extraction.strategy {
                    debug!(
                        "chunk {} at {:#x}: {} records via {:?}",
                        chunk.index,
                        chunk.offset,
                        extraction.players.len(),
                        strategy
                    );
                }
                candidates.extend(extraction.players.into_iter().map(|mut player| {
                    player.chunk = Some(chunk.index);
                    player
                }));
            }

            progress.processed_chunks += 1;
            progress.players_found = candidates.len();
            if progress.processed_chunks % PROGRESS_BATCH == 0 {
                let pct = progress.extraction_percent(EXTRACT_START_PCT, EXTRACT_END_PCT);
                progress.emit(
                    ParseStage::Extracting,
                    pct,
                    format!("{} chunks processed", progress.processed_chunks),
                );
            }
        }
        progress.emit(
            ParseStage::Extracting,
            EXTRACT_END_PCT,
            format!("{} candidate records", candidates.len()),
        );

        if candidates.is_empty() && self.cfg.enable_full_scan {
            let full = FullFileScanner.scan(data, &reader);
            stats.used_full_scan = true;
            stats.bytes_scanned += full.bytes_scanned;
            candidates = full.players;
            progress.players_found = candidates.len();
            progress.emit(
                ParseStage::FullScan,
                90,
                format!("{} records from full-file scan", candidates.len()),
            );
        }

        stats.candidates = candidates.len();
        let (players, duplicates) = dedup_players(candidates);
        stats.duplicates_removed = duplicates;
        progress.players_found = players.len();
        progress.emit(
            ParseStage::Deduplicating,
            95,
            format!("{duplicates} duplicates removed"),
        );

        if players.is_empty() {
            let err = ParseError::NoRecordsFound {
                total_chunks: chunks.len(),
                skipped_compressed: stats.skipped_compressed,
                bytes_scanned: stats.bytes_scanned,
            };
            warn!("{err}");
            progress.emit(ParseStage::Failed, 100, err.to_string());
            return ParseResult {
                total_chunks: chunks.len(),
                medium_chunks,
                ..ParseResult::failed(ContainerFormat::FbChunks, &err, stats)
            };
        }

        info!(
            "parsed {} players from {} chunks ({} medium, {} duplicates removed, full_scan={})",
            players.len(),
            chunks.len(),
            medium_chunks,
            duplicates,
            stats.used_full_scan
        );
        progress.emit(
            ParseStage::Complete,
            100,
            format!("{} players", players.len()),
        );

        ParseResult {
            success: true,
            format: ContainerFormat::FbChunks,
            players,
            total_chunks: chunks.len(),
            medium_chunks,
            error: None,
            stats,
        }
    }
}

/// Parses `data` with the default configuration and no progress observer.
pub fn parse_squad(data: &[u8]) -> ParseResult {
    SquadParser::default().parse(data, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{DIRECTORY_END, SIGNATURE};

    #[test]
    fn rejects_missing_signature() {
        let result = parse_squad(&[0u8; 4096]);
        assert!(!result.success);
        assert_eq!(result.format, ContainerFormat::Unknown);
        assert!(result.players.is_empty());
        assert_eq!(result.error.as_deref(), Some("input is not an fbchunks container"));
    }

    #[test]
    fn empty_container_reports_no_records() {
        let mut data = vec![0u8; DIRECTORY_END + 512];
        data[..8].copy_from_slice(&SIGNATURE);
        let result = parse_squad(&data);
        assert!(!result.success);
        assert_eq!(result.format, ContainerFormat::FbChunks);
        assert!(result.stats.used_full_scan);
        assert!(result.error.unwrap().starts_with("no player records found"));
    }

    #[test]
    fn full_scan_can_be_disabled() {
        let mut data = vec![0u8; DIRECTORY_END + 512];
        data[..8].copy_from_slice(&SIGNATURE);
        let parser = SquadParser::new(ScanConfig {
            enable_full_scan: false,
            ..ScanConfig::default()
        });
        let result = parser.parse(&data, None);
        assert!(!result.success);
        assert!(!result.stats.used_full_scan);
    }
}
