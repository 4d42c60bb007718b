//! Synthetic fbchunks containers for integration tests.

#![allow(dead_code)]

use squadcarve::format::{DIRECTORY_END, DIRECTORY_ENTRY_SIZE, DIRECTORY_OFFSET, SIGNATURE};
use squadcarve::record::{
    AGE_OFFSET, OVERALL_RATING_OFFSET, POTENTIAL_OFFSET, RECORD_MARKER, RECORD_SIZE,
};

pub const POSITION_CB: u8 = 5;

#[derive(Debug, Clone, Copy)]
pub struct PlayerSpec {
    pub id: u32,
    pub rating: u8,
    pub potential: u8,
    pub age: u8,
}

impl PlayerSpec {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            rating: 72,
            potential: 80,
            age: 24,
        }
    }

    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = rating;
        self
    }

    pub fn potential(mut self, potential: u8) -> Self {
        self.potential = potential;
        self
    }

    pub fn age(mut self, age: u8) -> Self {
        self.age = age;
        self
    }

    /// 144-byte record. The position byte and attribute block are filled with
    /// values outside the age range so windows shifted into a record never
    /// validate.
    pub fn bytes(&self) -> Vec<u8> {
        let mut w = vec![0u8; RECORD_SIZE];
        w[0..4].copy_from_slice(&self.id.to_le_bytes());
        w[16] = 55; // height, biased
        w[17] = 48; // weight, biased
        w[18] = 1; // right foot
        w[19] = POSITION_CB;
        w[OVERALL_RATING_OFFSET] = self.rating;
        w[POTENTIAL_OFFSET] = self.potential;
        w[AGE_OFFSET] = self.age;
        for b in &mut w[32..66] {
            *b = 70;
        }
        w[80..84].copy_from_slice(&241u32.to_le_bytes());
        w
    }
}

/// Contiguous records, no framing.
pub fn records(ids: &[u32]) -> Vec<u8> {
    ids.iter().flat_map(|&id| PlayerSpec::new(id).bytes()).collect()
}

/// Records each preceded by the two-byte marker.
pub fn marker_records(ids: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &id in ids {
        out.extend_from_slice(&RECORD_MARKER);
        out.extend_from_slice(&PlayerSpec::new(id).bytes());
    }
    out
}

pub struct ContainerBuilder {
    data: Vec<u8>,
    next_slot: usize,
}

impl ContainerBuilder {
    /// Zero-filled container of `len` bytes with signature and version 1.
    pub fn new(len: usize) -> Self {
        let mut data = vec![0u8; len.max(16)];
        data[..8].copy_from_slice(&SIGNATURE);
        data[8..12].copy_from_slice(&1u32.to_le_bytes());
        Self { data, next_slot: 0 }
    }

    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> &mut Self {
        let end = offset + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
        self
    }

    pub fn entry(&mut self, flags: u32, offset: u32, uncompressed: u32, compressed: u32) -> &mut Self {
        let at = DIRECTORY_OFFSET + self.next_slot * DIRECTORY_ENTRY_SIZE;
        let mut raw = Vec::with_capacity(DIRECTORY_ENTRY_SIZE);
        for word in [flags, offset, uncompressed, compressed] {
            raw.extend_from_slice(&word.to_le_bytes());
        }
        self.next_slot += 1;
        self.write_at(at, &raw)
    }

    /// Writes `payload` at `offset` and registers it as an uncompressed chunk.
    pub fn chunk(&mut self, offset: usize, payload: &[u8]) -> &mut Self {
        self.write_at(offset, payload);
        self.entry(0, offset as u32, payload.len() as u32, 0)
    }

    pub fn build(&self) -> Vec<u8> {
        self.data.clone()
    }
}

pub fn data_start() -> usize {
    DIRECTORY_END
}

/// Deterministic byte noise for robustness tests.
pub fn noise(len: usize, mut seed: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 33) as u8
        })
        .collect()
}
