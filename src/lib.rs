//! Recovery of player records from fbchunks squad exports.
//!
//! The container format is undocumented, so decoding is layered: the chunk
//! directory is trusted when it is sane, heuristic scans fill in when it is
//! not, and a byte-by-byte scan of the whole data region is the last resort.
//! Every candidate record is range-checked before it is reported.
//!
//! ```rust
//! use squadcarve::parse_squad;
//!
//! let result = parse_squad(b"definitely not a squad file");
//! assert!(!result.success);
//! assert_eq!(result.format.as_str(), "unknown");
//! ```

pub mod chunk;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod directory;
pub mod evidence;
pub mod extract;
pub mod format;
pub mod fullscan;
pub mod heuristic;
pub mod labels;
pub mod logging;
pub mod output;
pub mod parser;
pub mod progress;
pub mod record;
pub mod util;
pub mod validate;

pub use format::{ContainerFormat, detect_format};
pub use parser::{ParseError, ParseResult, ParseStats, SquadParser, parse_squad};
pub use progress::{ParseProgress, ParseStage, ProgressReporter};
pub use record::ParsedPlayer;
