//! Chunk directory parsing.
//!
//! The directory is a fixed table of 16-byte little-endian entries at
//! [`DIRECTORY_OFFSET`]. Every field is checked against the buffer before a
//! descriptor is produced; a damaged table degrades to heuristic discovery
//! rather than an error.

use tracing::debug;

use crate::chunk::{ChunkDescriptor, ChunkSource, effective_size};
use crate::config::ScanConfig;
use crate::format::{
    DIRECTORY_END, DIRECTORY_ENTRY_SIZE, DIRECTORY_OFFSET, FLAG_COMPRESSED, MAX_CHUNK_SIZE,
    MAX_DIRECTORY_ENTRIES, read_u32_le,
};
use crate::heuristic::HeuristicChunkScanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDirectoryEntry {
    pub flags: u32,
    pub offset: u32,
    pub uncompressed_size: u32,
    pub compressed_size: u32,
}

impl RawDirectoryEntry {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            flags: read_u32_le(bytes, 0)?,
            offset: read_u32_le(bytes, 4)?,
            uncompressed_size: read_u32_le(bytes, 8)?,
            compressed_size: read_u32_le(bytes, 12)?,
        })
    }

    pub fn is_null(&self) -> bool {
        self.offset == 0 && self.uncompressed_size == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRejection {
    InsideHeader,
    OversizedLength,
    PastEnd,
}

/// Turns a raw entry into a descriptor if it is consistent with a buffer of
/// `buffer_len` bytes.
pub fn validate_entry(
    index: u32,
    entry: &RawDirectoryEntry,
    buffer_len: usize,
) -> Result<ChunkDescriptor, EntryRejection> {
    if (entry.offset as usize) < DIRECTORY_END {
        return Err(EntryRejection::InsideHeader);
    }
    if entry.uncompressed_size > MAX_CHUNK_SIZE {
        return Err(EntryRejection::OversizedLength);
    }
    let size = effective_size(entry.uncompressed_size, entry.compressed_size);
    if entry.offset as u64 + size > buffer_len as u64 {
        return Err(EntryRejection::PastEnd);
    }

    let shrunk = entry.compressed_size > 0 && entry.compressed_size < entry.uncompressed_size;
    Ok(ChunkDescriptor {
        index,
        offset: entry.offset as u64,
        uncompressed_size: entry.uncompressed_size,
        compressed_size: (entry.compressed_size > 0).then_some(entry.compressed_size),
        is_compressed: shrunk || entry.flags & FLAG_COMPRESSED != 0,
        source: ChunkSource::Directory,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryScan {
    pub chunks: Vec<ChunkDescriptor>,
    pub null_entries: usize,
    pub rejected: usize,
    /// Buffer too short to hold the table.
    pub skipped: bool,
}

pub fn read_directory(data: &[u8]) -> DirectoryScan {
    let mut scan = DirectoryScan::default();
    if data.len() < DIRECTORY_END {
        scan.skipped = true;
        return scan;
    }

    for index in 0..MAX_DIRECTORY_ENTRIES {
        let start = DIRECTORY_OFFSET + index * DIRECTORY_ENTRY_SIZE;
        let Some(entry) = RawDirectoryEntry::parse(&data[start..start + DIRECTORY_ENTRY_SIZE])
        else {
            continue;
        };
        if entry.is_null() {
            scan.null_entries += 1;
            continue;
        }
        match validate_entry(index as u32, &entry, data.len()) {
            Ok(chunk) => scan.chunks.push(chunk),
            Err(reason) => {
                scan.rejected += 1;
                debug!(
                    "directory entry {index} rejected ({reason:?}): offset={:#x} size={}",
                    entry.offset, entry.uncompressed_size
                );
            }
        }
    }
    scan
}

/// Adds heuristic chunks that do not start within `proximity` bytes of an
/// existing chunk. Returns how many were added.
pub fn merge_candidates(
    chunks: &mut Vec<ChunkDescriptor>,
    candidates: Vec<ChunkDescriptor>,
    proximity: u64,
) -> usize {
    let mut added = 0;
    for candidate in candidates {
        let collides = chunks
            .iter()
            .any(|existing| existing.offset.abs_diff(candidate.offset) <= proximity);
        if !collides {
            chunks.push(candidate);
            added += 1;
        }
    }
    added
}

#[derive(Debug, Clone, Default)]
pub struct ChunkLayout {
    pub chunks: Vec<ChunkDescriptor>,
    pub directory_entries: usize,
    pub heuristic_chunks: usize,
}

pub struct ChunkDirectoryReader {
    min_entries: usize,
    proximity: u64,
}

impl ChunkDirectoryReader {
    pub fn new(cfg: &ScanConfig) -> Self {
        Self {
            min_entries: cfg.min_directory_entries,
            proximity: cfg.merge_proximity,
        }
    }

    /// Directory entries first, topped up by `scanner` when the directory is
    /// missing or yields fewer than the configured minimum.
    pub fn locate_chunks(&self, data: &[u8], scanner: &HeuristicChunkScanner) -> ChunkLayout {
        let directory = read_directory(data);
        let directory_entries = directory.chunks.len();
        let mut chunks = directory.chunks;

        if directory.skipped {
            debug!("buffer shorter than directory table, using heuristic scan only");
        } else if directory_entries < self.min_entries {
            debug!(
                "directory yielded {} entries ({} rejected), supplementing with heuristic scan",
                directory_entries, directory.rejected
            );
        }

        let heuristic_chunks = if directory_entries < self.min_entries {
            merge_candidates(&mut chunks, scanner.scan(data), self.proximity)
        } else {
            0
        };

        ChunkLayout {
            chunks,
            directory_entries,
            heuristic_chunks,
        }
    }
}
