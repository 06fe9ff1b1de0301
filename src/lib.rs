//! # wa2csv
//!
//! A Rust library for turning WhatsApp TXT chat exports into structured
//! records and CSV.
//!
//! ## Overview
//!
//! WhatsApp changed its export layout several times. wa2csv:
//! - **detects** which historical layout a log uses from its first line
//! - **reassembles** multi-line messages while reading strictly line by line
//! - **decodes** each message into timestamp, author and content, flagging
//!   system notifications that have no author
//! - **normalizes** timestamps through configurable formats and timezones
//!   into display strings and epoch milliseconds
//!
//! ## Quick Start
//!
//! ```rust
//! use wa2csv::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let log = "27/02/14, 06:29 - Steve: We won.\nTruly.\n27/02/14, 06:30 - Tony Stark was added";
//!
//!     let records = ChatLogParser::new().multiline(true).parse_str(log)?;
//!     assert_eq!(records[0].content, "We won.\nTruly.");
//!     assert!(records[1].is_notification);
//!
//!     let csv = to_delimited_text(&records, &default_fields());
//!     assert!(csv.starts_with("date,hour,author,content\n27/02/14,06:29,"));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - [`ChatLogParser`], [`ParseSession`], [`RecordIter`], [`LossyLines`]
//! - [`pattern`] - [`Pattern`], built-in layouts and detection
//! - [`aggregator`] - line-to-block reassembly
//! - [`record`] - [`Record`] and decoding
//! - [`date`] - date formats, reformatting and epoch conversion
//! - [`transform`] - record transform pipeline
//! - [`output`] - field descriptors and CSV writers
//! - [`config`] - [`ParserConfig`](config::ParserConfig)
//! - [`error`] - [`Wa2csvError`], [`Result`]
//! - [`cli`] - CLI argument types (feature `cli`)

pub mod aggregator;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod output;
pub mod parser;
pub mod pattern;
pub mod record;
pub mod transform;

// Re-export the main types at the crate root for convenience
pub use error::{Result, Wa2csvError};
pub use parser::{ChatLogParser, LossyLines, ParseSession, RecordIter};
pub use pattern::Pattern;
pub use record::Record;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use wa2csv::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, Wa2csvError};

    pub use crate::Record;
    pub use crate::parser::ChatLogParser;
    pub use crate::pattern::{BuiltinPattern, Pattern};

    pub use crate::config::{DateFormatConfig, ParserConfig};

    pub use crate::transform::Transform;

    pub use crate::output::{
        BuiltinField, Field, default_fields, field, to_delimited_text, write_delimited_text,
    };
    #[cfg(feature = "csv-output")]
    pub use crate::output::{to_quoted_csv, write_quoted_csv};
}
