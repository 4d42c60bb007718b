//! Record extraction strategies.
//!
//! A chunk is handed to each strategy in priority order until one of them
//! produces at least one record. New heuristics plug in by implementing
//! [`ExtractStrategy`] and being added to the extractor's list.

use memchr::memmem;
use serde::Serialize;
use tracing::trace;

use crate::record::{ParsedPlayer, RECORD_MARKER, RECORD_SIZE, RecordDecoder};
use crate::validate::{RecordValidator, VALIDATED_FIELDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MarkerScan,
    StrideScan,
    ByteScan,
    FullScan,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MarkerScan => "marker_scan",
            StrategyKind::StrideScan => "stride_scan",
            StrategyKind::ByteScan => "byte_scan",
            StrategyKind::FullScan => "full_scan",
        }
    }
}

/// Decoder and validator for one parse call.
#[derive(Debug, Clone, Default)]
pub struct RecordReader {
    decoder: RecordDecoder,
    validator: RecordValidator,
}

impl RecordReader {
    pub fn new(decoder: RecordDecoder, validator: RecordValidator) -> Self {
        Self { decoder, validator }
    }

    pub fn decoder(&self) -> &RecordDecoder {
        &self.decoder
    }

    /// Decodes and validates the record window starting at `pos`. Only the
    /// validated fields are decoded until the window passes.
    pub fn read_at(
        &self,
        data: &[u8],
        pos: usize,
        base_offset: u64,
        strategy: StrategyKind,
    ) -> Option<ParsedPlayer> {
        let window = data.get(pos..pos.checked_add(RECORD_SIZE)?)?;
        let offset = base_offset + pos as u64;
        let core = self
            .decoder
            .decode_where(window, |spec| VALIDATED_FIELDS.contains(&spec.name));
        if let Err(reason) = self.validator.validate(&core) {
            trace!("reject window at {offset:#x}: {reason}");
            return None;
        }
        ParsedPlayer::from_decoded(self.decoder.decode(window), offset, strategy)
    }
}

pub trait ExtractStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;
    /// `None` when the strategy found nothing in `data`.
    fn attempt(
        &self,
        data: &[u8],
        base_offset: u64,
        reader: &RecordReader,
    ) -> Option<Vec<ParsedPlayer>>;
}

pub struct MarkerScan;

impl ExtractStrategy for MarkerScan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MarkerScan
    }

    fn attempt(
        &self,
        data: &[u8],
        base_offset: u64,
        reader: &RecordReader,
    ) -> Option<Vec<ParsedPlayer>> {
        let finder = memmem::Finder::new(&RECORD_MARKER);
        let mut players = Vec::new();
        let mut pos = 0usize;
        while pos < data.len() {
            let Some(found) = finder.find(&data[pos..]) else {
                break;
            };
            let record_start = pos + found + RECORD_MARKER.len();
            match reader.read_at(data, record_start, base_offset, self.kind()) {
                Some(player) => {
                    players.push(player);
                    pos = record_start + RECORD_SIZE;
                }
                None => pos = pos + found + 1,
            }
        }
        non_empty(players)
    }
}

pub struct StrideScan;

impl ExtractStrategy for StrideScan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StrideScan
    }

    fn attempt(
        &self,
        data: &[u8],
        base_offset: u64,
        reader: &RecordReader,
    ) -> Option<Vec<ParsedPlayer>> {
        let players = (0..data.len() / RECORD_SIZE)
            .filter_map(|slot| {
                reader.read_at(data, slot * RECORD_SIZE, base_offset, self.kind())
            })
            .collect();
        non_empty(players)
    }
}

/// Slides one byte at a time. Expensive; only reached when the cheaper
/// strategies come back empty.
pub struct ByteScan;

impl ExtractStrategy for ByteScan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ByteScan
    }

    fn attempt(
        &self,
        data: &[u8],
        base_offset: u64,
        reader: &RecordReader,
    ) -> Option<Vec<ParsedPlayer>> {
        non_empty(scan_bytes(data, base_offset, reader, self.kind()))
    }
}

/// Byte-granularity scan shared by [`ByteScan`] and the full-file fallback.
/// An accepted record moves the cursor past itself so the same record is not
/// reported again shifted by one byte.
pub fn scan_bytes(
    data: &[u8],
    base_offset: u64,
    reader: &RecordReader,
    kind: StrategyKind,
) -> Vec<ParsedPlayer> {
    let mut players = Vec::new();
    let mut pos = 0usize;
    while pos + RECORD_SIZE <= data.len() {
        match reader.read_at(data, pos, base_offset, kind) {
            Some(player) => {
                players.push(player);
                pos += RECORD_SIZE;
            }
            None => pos += 1,
        }
    }
    players
}

fn non_empty(players: Vec<ParsedPlayer>) -> Option<Vec<ParsedPlayer>> {
    if players.is_empty() { None } else { Some(players) }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub players: Vec<ParsedPlayer>,
    pub strategy: Option<StrategyKind>,
}

pub struct RecordExtractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(MarkerScan),
            Box::new(StrideScan),
            Box::new(ByteScan),
        ])
    }
}

impl RecordExtractor {
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    pub fn extract(&self, data: &[u8], base_offset: u64, reader: &RecordReader) -> Extraction {
        for strategy in &self.strategies {
            if let Some(players) = strategy.attempt(data, base_offset, reader) {
                return Extraction {
                    players,
                    strategy: Some(strategy.kind()),
                };
            }
        }
        Extraction::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AGE_OFFSET, OVERALL_RATING_OFFSET, POTENTIAL_OFFSET};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(id: u32) -> Vec<u8> {
        let mut w = vec![0u8; RECORD_SIZE];
        w[0..4].copy_from_slice(&id.to_le_bytes());
        w[OVERALL_RATING_OFFSET] = 70;
        w[POTENTIAL_OFFSET] = 80;
        w[AGE_OFFSET] = 28;
        // position byte outside the age range keeps shifted windows invalid
        w[19] = 5;
        w
    }

    fn ids(players: &[ParsedPlayer]) -> Vec<u32> {
        players.iter().map(|p| p.playerid).collect()
    }

    #[test]
    fn marker_scan_reads_window_after_marker() {
        let mut data = vec![0u8; 7];
        for id in [11, 22] {
            data.extend_from_slice(&RECORD_MARKER);
            data.extend_from_slice(&record(id));
        }
        let players = MarkerScan
            .attempt(&data, 1000, &RecordReader::default())
            .expect("records");
        assert_eq!(ids(&players), vec![11, 22]);
        assert_eq!(players[0].offset, 1000 + 9);
        assert_eq!(players[0].strategy, StrategyKind::MarkerScan);
    }

    #[test]
    fn marker_scan_skips_rejected_markers() {
        let mut data = Vec::new();
        data.extend_from_slice(&RECORD_MARKER);
        data.extend_from_slice(&[0u8; 10]);
        data.extend_from_slice(&RECORD_MARKER);
        data.extend_from_slice(&record(33));
        let players = MarkerScan
            .attempt(&data, 0, &RecordReader::default())
            .expect("records");
        assert_eq!(ids(&players), vec![33]);
    }

    #[test]
    fn stride_scan_uses_aligned_slices() {
        let mut data = record(1);
        data.extend_from_slice(&vec![0u8; RECORD_SIZE]);
        data.extend_from_slice(&record(3));
        data.extend_from_slice(&[9u8; 20]);
        let players = StrideScan
            .attempt(&data, 0, &RecordReader::default())
            .expect("records");
        assert_eq!(ids(&players), vec![1, 3]);
        assert_eq!(players[1].offset, 2 * RECORD_SIZE as u64);
    }

    #[test]
    fn byte_scan_finds_unaligned_records_once() {
        let mut data = vec![0u8; 5];
        data.extend_from_slice(&record(42));
        data.extend_from_slice(&[0u8; 3]);
        let players = ByteScan
            .attempt(&data, 0, &RecordReader::default())
            .expect("records");
        assert_eq!(ids(&players), vec![42]);
        assert_eq!(players[0].offset, 5);
    }

    #[test]
    fn early_rejection_agrees_with_full_validation() {
        let reader = RecordReader::default();
        let mut data = vec![0u8; 4096];
        let mut seed = 0x9E37_79B9_7F4A_7C15u64;
        for b in &mut data {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            *b = (seed >> 56) as u8;
        }
        // a few windows that do pass
        data[100..100 + RECORD_SIZE].copy_from_slice(&record(9));
        data[2000..2000 + RECORD_SIZE].copy_from_slice(&record(10));

        let mut accepted = 0;
        for pos in 0..=data.len() - RECORD_SIZE {
            let window = &data[pos..pos + RECORD_SIZE];
            let full = reader.decoder().decode(window);
            let expected = RecordValidator.accepts(&full);
            let read = reader.read_at(&data, pos, 0, StrategyKind::ByteScan);
            assert_eq!(read.is_some(), expected, "pos {pos}");
            if let Some(player) = read {
                assert_eq!(player.fields, full.fields);
                accepted += 1;
            }
        }
        assert!(accepted >= 2);
    }

    #[test]
    fn empty_data_yields_nothing() {
        let reader = RecordReader::default();
        let extraction = RecordExtractor::default().extract(&[], 0, &reader);
        assert!(extraction.players.is_empty());
        assert!(extraction.strategy.is_none());
    }

    struct Counting {
        kind: StrategyKind,
        calls: Arc<AtomicUsize>,
        yields: bool,
    }

    impl ExtractStrategy for Counting {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn attempt(&self, data: &[u8], base: u64, reader: &RecordReader) -> Option<Vec<ParsedPlayer>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.yields {
                StrideScan.attempt(data, base, reader)
            } else {
                None
            }
        }
    }

    #[test]
    fn first_productive_strategy_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));
        let extractor = RecordExtractor::with_strategies(vec![
            Box::new(Counting { kind: StrategyKind::MarkerScan, calls: first.clone(), yields: false }),
            Box::new(Counting { kind: StrategyKind::StrideScan, calls: second.clone(), yields: true }),
            Box::new(Counting { kind: StrategyKind::ByteScan, calls: third.clone(), yields: true }),
        ]);
        let extraction = extractor.extract(&record(7), 0, &RecordReader::default());
        assert_eq!(extraction.strategy, Some(StrategyKind::StrideScan));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn marker_results_suppress_stride_results() {
        // One marker-framed record followed by an aligned bare record that
        // only the stride scan could see.
        let mut data = Vec::new();
        data.extend_from_slice(&RECORD_MARKER);
        data.extend_from_slice(&record(100));
        data.resize(2 * RECORD_SIZE, 0);
        data.extend_from_slice(&record(200));
        let extraction = RecordExtractor::default().extract(&data, 0, &RecordReader::default());
        assert_eq!(extraction.strategy, Some(StrategyKind::MarkerScan));
        assert_eq!(ids(&extraction.players), vec![100]);
    }
}
