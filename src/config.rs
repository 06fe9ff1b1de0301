//! Parser configuration.
//!
//! [`ParserConfig`] is a plain data struct, free of CLI framework
//! dependencies, so it can be built in code or deserialized from any serde
//! format. Record transforms are code, not data, and are registered on
//! [`ChatLogParser`](crate::ChatLogParser) instead.
//!
//! # Example
//!
//! ```rust
//! use wa2csv::config::{DateFormatConfig, ParserConfig};
//!
//! let config = ParserConfig::new()
//!     .with_multiline(true)
//!     .with_date_format(DateFormatConfig::new("DD/MM/YY, HH:mm").with_output("YYYY-MM-DD HH:mm"))
//!     .with_timezone("Asia/Jerusalem")
//!     .with_timestamp(true);
//!
//! assert!(config.multiline);
//! ```

use serde::{Deserialize, Serialize};

/// Input and output date formats, in the token grammar of [`crate::date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormatConfig {
    /// Format the raw timestamp is parsed with
    pub input: String,

    /// Format the timestamp is re-emitted with. Without it the raw string is
    /// kept and `input` is only used for timestamping.
    #[serde(default)]
    pub output: Option<String>,
}

impl DateFormatConfig {
    /// Creates a configuration that parses with `input`.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: None,
        }
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Configuration for a parse session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Record-start regex with a timestamp group and a content group.
    /// Auto-detected from the input when unset (default).
    pub pattern: Option<String>,

    /// Reassemble messages spanning several lines (default: false).
    /// In single-line mode lines that do not start a record are discarded.
    pub multiline: bool,

    /// IANA timezone the wall-clock timestamps are written in (default: none, read as UTC)
    pub timezone: Option<String>,

    /// Date formats used to reformat and timestamp records (default: none)
    pub date_format: Option<DateFormatConfig>,

    /// Attach `timestamp_epoch` to every record (default: false)
    pub timestamp: bool,
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit record-start regex.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Enables or disables multi-line mode.
    #[must_use]
    pub fn with_multiline(mut self, enabled: bool) -> Self {
        self.multiline = enabled;
        self
    }

    /// Sets the timezone.
    #[must_use]
    pub fn with_timezone(mut self, zone: impl Into<String>) -> Self {
        self.timezone = Some(zone.into());
        self
    }

    /// Sets the date formats.
    #[must_use]
    pub fn with_date_format(mut self, formats: DateFormatConfig) -> Self {
        self.date_format = Some(formats);
        self
    }

    /// Enables or disables epoch timestamps.
    #[must_use]
    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.timestamp = enabled;
        self
    }
}
