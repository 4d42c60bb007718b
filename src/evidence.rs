//! Loading the input container into memory.
//!
//! Parsing is entirely in-memory, so this is the only I/O on the parse path.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Refuse inputs larger than this; squad exports are tens of megabytes.
pub const MAX_INPUT_SIZE: u64 = 512 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("input is not a regular file: {0}")]
    NotAFile(String),
}

pub fn load_input(path: &Path) -> Result<Vec<u8>, EvidenceError> {
    let mut file = File::open(path)?;
    let metadata = file.metadata()?;
    if !metadata.is_file() {
        return Err(EvidenceError::NotAFile(path.display().to_string()));
    }
    let size = metadata.len();
    if size > MAX_INPUT_SIZE {
        return Err(EvidenceError::TooLarge {
            size,
            limit: MAX_INPUT_SIZE,
        });
    }
    let mut data = Vec::with_capacity(size as usize);
    file.read_to_end(&mut data)?;
    Ok(data)
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
