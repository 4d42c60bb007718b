//! Fixed-size player record layout and decoding.
//!
//! The field table below is the only description of the record format that
//! exists. A wrong offset does not fail to decode, it silently produces
//! plausible numbers, which is why every decoded record also goes through
//! [`crate::validate::RecordValidator`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::extract::StrategyKind;

pub const RECORD_SIZE: usize = 144;
/// Two-byte delimiter that precedes a record in marker-framed tables.
pub const RECORD_MARKER: [u8; 2] = [0xAB, 0xCD];

pub const PLAYER_ID_OFFSET: usize = 0;
pub const OVERALL_RATING_OFFSET: usize = 20;
pub const POTENTIAL_OFFSET: usize = 21;
pub const AGE_OFFSET: usize = 22;

pub const ATTRIBUTE_MIN: u32 = 1;
pub const ATTRIBUTE_MAX: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    /// 1, 2 or 4 bytes, little-endian unsigned.
    pub width: usize,
    pub clamped: bool,
}

const fn raw(name: &'static str, offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        name,
        offset,
        width,
        clamped: false,
    }
}

const fn attr(name: &'static str, offset: usize) -> FieldSpec {
    FieldSpec {
        name,
        offset,
        width: 1,
        clamped: true,
    }
}

pub static PLAYER_FIELDS: &[FieldSpec] = &[
    raw("playerid", PLAYER_ID_OFFSET, 4),
    raw("firstnameid", 4, 2),
    raw("lastnameid", 6, 2),
    raw("commonnameid", 8, 2),
    raw("nationality", 10, 2),
    raw("birthdate", 12, 4),
    raw("height", 16, 1),
    raw("weight", 17, 1),
    raw("preferredfoot", 18, 1),
    raw("preferredposition1", 19, 1),
    attr("overallrating", OVERALL_RATING_OFFSET),
    attr("potential", POTENTIAL_OFFSET),
    raw("age", AGE_OFFSET, 1),
    raw("skillmoves", 23, 1),
    raw("weakfootabilitytypecode", 24, 1),
    raw("internationalrep", 25, 1),
    raw("preferredposition2", 26, 1),
    attr("acceleration", 32),
    attr("sprintspeed", 33),
    attr("agility", 34),
    attr("balance", 35),
    attr("jumping", 36),
    attr("stamina", 37),
    attr("strength", 38),
    attr("reactions", 39),
    attr("aggression", 40),
    attr("composure", 41),
    attr("interceptions", 42),
    attr("positioning", 43),
    attr("vision", 44),
    attr("ballcontrol", 45),
    attr("crossing", 46),
    attr("dribbling", 47),
    attr("finishing", 48),
    attr("freekickaccuracy", 49),
    attr("headingaccuracy", 50),
    attr("longpassing", 51),
    attr("shortpassing", 52),
    attr("defensiveawareness", 53),
    attr("shotpower", 54),
    attr("longshots", 55),
    attr("standingtackle", 56),
    attr("slidingtackle", 57),
    attr("volleys", 58),
    attr("curve", 59),
    attr("penalties", 60),
    attr("gkdiving", 61),
    attr("gkhandling", 62),
    attr("gkkicking", 63),
    attr("gkpositioning", 64),
    attr("gkreflexes", 65),
    raw("teamid", 80, 4),
    raw("jerseynumber", 84, 1),
    raw("contractvaliduntil", 86, 2),
    raw("value", 88, 4),
    raw("wage", 92, 4),
];

pub fn clamp_attribute(value: u32) -> u32 {
    value.clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX)
}

/// Field values read from one window, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    pub fields: BTreeMap<&'static str, u32>,
}

impl DecodedRecord {
    pub fn get(&self, name: &str) -> Option<u32> {
        self.fields.get(name).copied()
    }

    pub fn player_id(&self) -> Option<u32> {
        self.get("playerid")
    }
}

/// Table-driven decoder. One instance is built per parse call and shared by
/// every strategy in that call.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    fields: &'static [FieldSpec],
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new(PLAYER_FIELDS)
    }
}

impl RecordDecoder {
    pub fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Fields that do not fit inside `window` are left out of the result.
    pub fn decode(&self, window: &[u8]) -> DecodedRecord {
        self.decode_where(window, |_| true)
    }

    /// Decodes only the fields accepted by `keep`.
    pub fn decode_where(&self, window: &[u8], keep: impl Fn(&FieldSpec) -> bool) -> DecodedRecord {
        let mut record = DecodedRecord::default();
        for spec in self.fields.iter().filter(|spec| keep(*spec)) {
            let Some(value) = read_le(window, spec.offset, spec.width) else {
                continue;
            };
            let value = if spec.clamped {
                clamp_attribute(value)
            } else {
                value
            };
            record.fields.insert(spec.name, value);
        }
        record
    }
}

fn read_le(window: &[u8], offset: usize, width: usize) -> Option<u32> {
    let bytes = window.get(offset..offset.checked_add(width)?)?;
    match *bytes {
        [a] => Some(a as u32),
        [a, b] => Some(u16::from_le_bytes([a, b]) as u32),
        [a, b, c, d] => Some(u32::from_le_bytes([a, b, c, d])),
        _ => None,
    }
}

/// A decoded record that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPlayer {
    pub playerid: u32,
    /// Absolute container offset of the record window.
    pub offset: u64,
    pub chunk: Option<u32>,
    pub strategy: StrategyKind,
    pub fields: BTreeMap<&'static str, u32>,
}

impl ParsedPlayer {
    pub fn from_decoded(record: DecodedRecord, offset: u64, strategy: StrategyKind) -> Option<Self> {
        let playerid = record.player_id()?;
        Some(Self {
            playerid,
            offset,
            chunk: None,
            strategy,
            fields: record.fields,
        })
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.fields.get(name).copied()
    }

    pub fn overall_rating(&self) -> Option<u32> {
        self.get("overallrating")
    }

    pub fn potential(&self) -> Option<u32> {
        self.get("potential")
    }

    pub fn age(&self) -> Option<u32> {
        self.get("age")
    }
}
