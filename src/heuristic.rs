//! Chunk recovery for containers whose directory is missing or unreliable.
//!
//! Two passes over the data region. The density pass probes every record
//! phase of a window and keeps the phase whose slots most often land on
//! rating-like and age-like bytes. The marker pass, used only when the
//! density pass finds nothing, counts record delimiters per window. Adjacent
//! qualifying windows are coalesced so a table spanning several windows
//! becomes one chunk.

use memchr::memmem;
use tracing::debug;

use crate::chunk::{ChunkDescriptor, ChunkSource};
use crate::config::ScanConfig;
use crate::format::{MAX_CHUNK_SIZE, MAX_DIRECTORY_ENTRIES, data_region_start};
use crate::record::{AGE_OFFSET, OVERALL_RATING_OFFSET, POTENTIAL_OFFSET, RECORD_MARKER, RECORD_SIZE};
use crate::validate::{MAX_AGE, MIN_AGE};

#[derive(Debug, Clone)]
pub struct HeuristicChunkScanner {
    density_window: usize,
    density_stride: usize,
    min_probe_hits: usize,
    marker_window: usize,
    min_marker_hits: usize,
}

impl HeuristicChunkScanner {
    pub fn new(cfg: &ScanConfig) -> Self {
        Self {
            density_window: cfg.density_window.max(RECORD_SIZE),
            density_stride: cfg.density_stride.max(1),
            min_probe_hits: cfg.min_probe_hits.max(1),
            marker_window: cfg.marker_window.max(RECORD_SIZE),
            min_marker_hits: cfg.min_marker_hits.max(1),
        }
    }

    pub fn scan(&self, data: &[u8]) -> Vec<ChunkDescriptor> {
        let dense = self.density_pass(data);
        if !dense.is_empty() {
            debug!("density scan found {} candidate chunks", dense.len());
            return dense;
        }
        let marked = self.marker_pass(data);
        debug!("marker scan found {} candidate chunks", marked.len());
        marked
    }

    pub fn density_pass(&self, data: &[u8]) -> Vec<ChunkDescriptor> {
        let mut regions = Regions::default();
        let mut cursor = data_region_start(data.len());
        while cursor < data.len() {
            let end = cursor.saturating_add(self.density_window).min(data.len());
            let window = &data[cursor..end];
            let (phase, hits) = best_phase(window);
            if hits >= self.min_probe_hits {
                // start at the first plausible slot, not the window edge
                let lead = window[phase..]
                    .chunks_exact(RECORD_SIZE)
                    .position(plausible_slot)
                    .unwrap_or(0);
                let start = cursor + phase + lead * RECORD_SIZE;
                let end = extend_run(data, start, end);
                regions.push(start, end);
                cursor = end;
            } else {
                cursor = cursor.saturating_add(self.density_stride);
            }
        }
        regions.into_chunks(ChunkSource::Density)
    }

    pub fn marker_pass(&self, data: &[u8]) -> Vec<ChunkDescriptor> {
        let finder = memmem::Finder::new(&RECORD_MARKER);
        let mut regions = Regions::default();
        let mut cursor = data_region_start(data.len());
        while cursor < data.len() {
            let end = cursor.saturating_add(self.marker_window).min(data.len());
            if finder.find_iter(&data[cursor..end]).count() >= self.min_marker_hits {
                regions.push(cursor, end);
            }
            cursor = end;
        }
        regions.into_chunks(ChunkSource::Marker)
    }
}

fn plausible_slot(slot: &[u8]) -> bool {
    let attribute = 1..=99u8;
    let age = MIN_AGE as u8..=MAX_AGE as u8;
    attribute.contains(&slot[OVERALL_RATING_OFFSET])
        && attribute.contains(&slot[POTENTIAL_OFFSET])
        && age.contains(&slot[AGE_OFFSET])
}

/// Counts record slots in `window`, stepping [`RECORD_SIZE`] from `phase`,
/// whose rating, potential and age bytes look like a player record.
pub fn probe_hits(window: &[u8], phase: usize) -> usize {
    window
        .get(phase..)
        .unwrap_or_default()
        .chunks_exact(RECORD_SIZE)
        .filter(|slot| plausible_slot(slot))
        .count()
}

/// Record phase within the first [`RECORD_SIZE`] bytes of `window` with the
/// most hits, and that hit count. Ties go to the earliest phase.
pub fn best_phase(window: &[u8]) -> (usize, usize) {
    let mut best = (0, 0);
    for phase in 0..RECORD_SIZE.min(window.len()) {
        let hits = probe_hits(window, phase);
        if hits > best.1 {
            best = (phase, hits);
        }
    }
    best
}

/// Walks the record grid anchored at `start` past `window_end` while slots
/// stay plausible, so a table straddling the window edge is kept whole.
fn extend_run(data: &[u8], start: usize, window_end: usize) -> usize {
    let mut slot = start + (window_end - start) / RECORD_SIZE * RECORD_SIZE;
    while let Some(bytes) = data.get(slot..slot + RECORD_SIZE) {
        if !plausible_slot(bytes) {
            break;
        }
        slot += RECORD_SIZE;
    }
    slot.max(window_end)
}

#[derive(Default)]
struct Regions {
    spans: Vec<(usize, usize)>,
}

impl Regions {
    fn push(&mut self, start: usize, end: usize) {
        if let Some(last) = self.spans.last_mut() {
            // a phase shift between windows leaves a gap shorter than a record
            if start >= last.1
                && start - last.1 < RECORD_SIZE
                && end - last.0 <= MAX_CHUNK_SIZE as usize
            {
                last.1 = end;
                return;
            }
        }
        self.spans.push((start, end));
    }

    fn into_chunks(self, source: ChunkSource) -> Vec<ChunkDescriptor> {
        self.spans
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| ChunkDescriptor {
                // keep heuristic indices clear of directory slots
                index: (MAX_DIRECTORY_ENTRIES + i) as u32,
                offset: start as u64,
                uncompressed_size: (end - start) as u32,
                compressed_size: None,
                is_compressed: false,
                source,
            })
            .collect()
    }
}
