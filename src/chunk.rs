use serde::Serialize;

use crate::record::RECORD_SIZE;

/// Chunks at or above this size are `Medium`.
pub const SMALL_CHUNK_LIMIT: u64 = 4 * 1024;
/// Chunks at or above this size are `Large`.
pub const MEDIUM_CHUNK_LIMIT: u64 = 512 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSource {
    Directory,
    Density,
    Marker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkDescriptor {
    pub index: u32,
    pub offset: u64,
    pub uncompressed_size: u32,
    pub compressed_size: Option<u32>,
    pub is_compressed: bool,
    pub source: ChunkSource,
}

impl ChunkDescriptor {
    /// Bytes the chunk occupies in the container.
    pub fn effective_size(&self) -> u64 {
        effective_size(self.uncompressed_size, self.compressed_size.unwrap_or(0))
    }

    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.effective_size())
    }

    pub fn size_class(&self) -> ChunkSizeClass {
        ChunkSizeClass::classify(self.effective_size())
    }

    /// Compressed large chunks need a codec this crate does not ship.
    pub fn is_readable(&self) -> bool {
        match self.size_class() {
            ChunkSizeClass::Tiny => false,
            ChunkSizeClass::Small | ChunkSizeClass::Medium => true,
            ChunkSizeClass::Large => !self.is_compressed,
        }
    }

    pub fn bytes<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.offset).ok()?;
        let end = usize::try_from(self.end()).ok()?;
        data.get(start..end)
    }
}

pub fn effective_size(uncompressed: u32, compressed: u32) -> u64 {
    if compressed > 0 && compressed < uncompressed {
        compressed as u64
    } else {
        uncompressed as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkSizeClass {
    Tiny,
    Small,
    Medium,
    Large,
}

impl ChunkSizeClass {
    pub fn classify(size: u64) -> Self {
        if size < RECORD_SIZE as u64 {
            ChunkSizeClass::Tiny
        } else if size < SMALL_CHUNK_LIMIT {
            ChunkSizeClass::Small
        } else if size < MEDIUM_CHUNK_LIMIT {
            ChunkSizeClass::Medium
        } else {
            ChunkSizeClass::Large
        }
    }

    /// Lower sorts first. Medium chunks are the usual home of player tables.
    pub fn priority(&self) -> u8 {
        match self {
            ChunkSizeClass::Medium => 0,
            ChunkSizeClass::Small => 1,
            ChunkSizeClass::Large => 2,
            ChunkSizeClass::Tiny => 3,
        }
    }
}

/// Stable ordering by size-class priority; chunks of one class keep their
/// discovery order.
pub fn processing_order(chunks: &[ChunkDescriptor]) -> Vec<&ChunkDescriptor> {
    let mut ordered: Vec<&ChunkDescriptor> = chunks.iter().collect();
    ordered.sort_by_key(|chunk| chunk.size_class().priority());
    ordered
}
