//! Human-readable vocabulary for coded record fields.
//!
//! The decoder reports raw integers; these helpers are for presentation in
//! the CSV output and are not used to accept or reject records.

const POSITIONS: [&str; 28] = [
    "GK", "SW", "RWB", "RB", "RCB", "CB", "LCB", "LB", "LWB", "RDM", "CDM", "LDM", "RM", "RCM",
    "CM", "LCM", "LM", "RAM", "CAM", "LAM", "RF", "CF", "LF", "RW", "RS", "ST", "LS", "LW",
];

/// Stored height is centimetres minus this bias.
pub const HEIGHT_BIAS_CM: u32 = 130;
/// Stored weight is kilograms minus this bias.
pub const WEIGHT_BIAS_KG: u32 = 30;

pub fn position_label(code: u32) -> Option<&'static str> {
    POSITIONS.get(code as usize).copied()
}

pub fn foot_label(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("Right"),
        2 => Some("Left"),
        _ => None,
    }
}

/// `None` for zero, which exports use for "not set".
pub fn height_cm(raw: u32) -> Option<u32> {
    (raw != 0).then(|| raw + HEIGHT_BIAS_CM)
}

pub fn weight_kg(raw: u32) -> Option<u32> {
    (raw != 0).then(|| raw + WEIGHT_BIAS_KG)
}
