//! Container signature and header layout for fbchunks squad exports.

use serde::Serialize;

/// Tag at offset 0 of every fbchunks container.
pub const SIGNATURE: [u8; 8] = *b"FBCHUNKS";
/// Signature plus the version and reserved words.
pub const MIN_HEADER_LEN: usize = 16;

pub const DIRECTORY_OFFSET: usize = 0x40;
pub const DIRECTORY_ENTRY_SIZE: usize = 16;
pub const MAX_DIRECTORY_ENTRIES: usize = 64;
/// First byte past the directory table; chunks must start at or after it.
pub const DIRECTORY_END: usize = DIRECTORY_OFFSET + DIRECTORY_ENTRY_SIZE * MAX_DIRECTORY_ENTRIES;

/// Directory flag bit marking a compressed payload.
pub const FLAG_COMPRESSED: u32 = 0x1;
/// Uncompressed sizes above this are treated as corrupt lengths.
pub const MAX_CHUNK_SIZE: u32 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[serde(rename = "fbchunks")]
    FbChunks,
    Unknown,
}

impl ContainerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::FbChunks => "fbchunks",
            ContainerFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u32,
    pub reserved: u32,
}

/// Returns true when `data` starts with the fbchunks signature and is long
/// enough to carry a header. Never panics; short input is simply `false`.
pub fn detect_format(data: &[u8]) -> bool {
    data.len() >= MIN_HEADER_LEN && data[..SIGNATURE.len()] == SIGNATURE
}

pub fn sniff_header(data: &[u8]) -> Option<ContainerHeader> {
    if !detect_format(data) {
        return None;
    }
    Some(ContainerHeader {
        version: read_u32_le(data, 8)?,
        reserved: read_u32_le(data, 12)?,
    })
}

/// Start of the region that may hold chunk payloads.
pub fn data_region_start(len: usize) -> usize {
    if len >= DIRECTORY_END {
        DIRECTORY_END
    } else {
        MIN_HEADER_LEN.min(len)
    }
}

pub(crate) fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
