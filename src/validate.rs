use thiserror::Error;

use crate::record::{ATTRIBUTE_MAX, ATTRIBUTE_MIN, DecodedRecord};

pub const MAX_PLAYER_ID: u32 = 1_000_000_000;
pub const MIN_AGE: u32 = 15;
pub const MAX_AGE: u32 = 50;

/// Why a candidate window was not accepted. Never surfaced to callers; it
/// only feeds trace logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing field {0}")]
    Missing(&'static str),
    #[error("player id {0} out of range")]
    PlayerId(u32),
    #[error("{field}={value} outside rating range")]
    Rating { field: &'static str, value: u32 },
    #[error("age {0} outside plausible range")]
    Age(u32),
}

/// The only fields [`RecordValidator::validate`] reads.
pub const VALIDATED_FIELDS: [&str; 4] = ["playerid", "overallrating", "potential", "age"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn validate(&self, record: &DecodedRecord) -> Result<(), Rejection> {
        let playerid = record.get("playerid").ok_or(Rejection::Missing("playerid"))?;
        if playerid == 0 || playerid >= MAX_PLAYER_ID {
            return Err(Rejection::PlayerId(playerid));
        }

        for field in ["overallrating", "potential"] {
            let value = record.get(field).ok_or(Rejection::Missing(field))?;
            if !(ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value) {
                return Err(Rejection::Rating { field, value });
            }
        }

        // zero means the export left age unset
        match record.get("age") {
            None | Some(0) => {}
            Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => {}
            Some(age) => return Err(Rejection::Age(age)),
        }

        Ok(())
    }

    pub fn accepts(&self, record: &DecodedRecord) -> bool {
        self.validate(record).is_ok()
    }
}
