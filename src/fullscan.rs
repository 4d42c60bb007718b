//! Last-resort scan of the whole data region.
//!
//! Only runs after directory and heuristic chunks produced nothing. It walks
//! every byte offset of the data region with the same decode and validate
//! logic as the per-chunk byte scan, so on a large input it is by far the
//! slowest path.
// TODO: check a cancellation flag every density_stride bytes once callers
// need to abort long fallback scans.

use tracing::info;

use crate::extract::{RecordReader, StrategyKind, scan_bytes};
use crate::format::data_region_start;
use crate::record::ParsedPlayer;

#[derive(Debug, Clone, Default)]
pub struct FullScan {
    pub players: Vec<ParsedPlayer>,
    pub bytes_scanned: u64,
}

pub struct FullFileScanner;

impl FullFileScanner {
    pub fn scan(&self, data: &[u8], reader: &RecordReader) -> FullScan {
        let start = data_region_start(data.len());
        let region = &data[start..];
        info!(
            "full-file scan over {} bytes starting at {start:#x}",
            region.len()
        );
        let players = scan_bytes(region, start as u64, reader, StrategyKind::FullScan);
        FullScan {
            players,
            bytes_scanned: region.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DIRECTORY_END;
    use crate::record::{AGE_OFFSET, OVERALL_RATING_OFFSET, POTENTIAL_OFFSET, RECORD_SIZE};

    #[test]
    fn finds_records_anywhere_in_data_region() {
        let mut data = vec![0u8; DIRECTORY_END + 1000];
        let at = DIRECTORY_END + 301;
        data[at..at + 4].copy_from_slice(&777u32.to_le_bytes());
        data[at + OVERALL_RATING_OFFSET] = 66;
        data[at + POTENTIAL_OFFSET] = 71;
        data[at + AGE_OFFSET] = 19;
        data[at + 19] = 4;

        let scan = FullFileScanner.scan(&data, &RecordReader::default());
        assert_eq!(scan.players.len(), 1);
        assert_eq!(scan.players[0].playerid, 777);
        assert_eq!(scan.players[0].offset, at as u64);
        assert_eq!(scan.players[0].strategy, StrategyKind::FullScan);
        assert_eq!(scan.bytes_scanned, 1000);
    }

    #[test]
    fn ignores_header_region() {
        // a record-shaped window inside the directory table is never read
        let mut data = vec![0u8; DIRECTORY_END + RECORD_SIZE];
        data[0x100..0x104].copy_from_slice(&5u32.to_le_bytes());
        data[0x100 + AGE_OFFSET] = 20;
        let scan = FullFileScanner.scan(&data, &RecordReader::default());
        assert!(scan.players.is_empty());
    }

    #[test]
    fn tiny_buffer_is_safe() {
        let scan = FullFileScanner.scan(&[1, 2, 3], &RecordReader::default());
        assert!(scan.players.is_empty());
    }
}
