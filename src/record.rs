//! Decoded chat records.
//!
//! A [`Record`] is built from one aggregated block of raw text in two stages:
//! the active [`Pattern`] splits off the timestamp, then a uniform author
//! prefix (`Name: `) is split off the content. The author delimiter is the same
//! in every export variant; only the timestamp delimiter differs.
//!
//! # Example
//!
//! ```
//! use wa2csv::{Pattern, Record};
//! use wa2csv::pattern::BuiltinPattern;
//!
//! let pattern = Pattern::builtin(BuiltinPattern::TwoDigitYear24h);
//!
//! let msg = Record::decode("27/02/14, 06:29 - Steve: We won.", &pattern)?;
//! assert_eq!(msg.author, "Steve");
//! assert_eq!(msg.content, "We won.");
//!
//! let notice = Record::decode("27/02/14, 06:29 - Tony Stark was added", &pattern)?;
//! assert!(notice.is_notification);
//! assert_eq!(notice.author, "");
//! # Ok::<(), wa2csv::Wa2csvError>(())
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, Wa2csvError};
use crate::pattern::Pattern;

static AUTHOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\n]+): ").expect("author pattern compiles"));

/// A decoded chat record.
///
/// | Field | Description |
/// |-------|-------------|
/// | `timestamp` | Raw timestamp, or the reformatted one when a date format is configured |
/// | `author` | Message author, empty for system notifications |
/// | `content` | Message body without timestamp or author prefix |
/// | `is_notification` | `true` when no author prefix was found |
/// | `timestamp_epoch` | Milliseconds since the UTC epoch, when timestamping is enabled |
/// | `invalid_date` | `true` when the timestamp could not be parsed with the configured format |
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: String,

    pub author: String,

    /// May contain newlines for multi-line messages.
    pub content: String,

    pub is_notification: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub timestamp_epoch: Option<i64>,

    /// Set instead of failing when the date normalizer cannot parse the
    /// timestamp. `timestamp` keeps its raw value in that case.
    #[serde(default)]
    pub invalid_date: bool,
}

impl Record {
    /// Creates an authored record.
    pub fn new(
        timestamp: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            author: author.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Creates a system notification record.
    pub fn notification(timestamp: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            content: content.into(),
            is_notification: true,
            ..Self::default()
        }
    }

    /// Decodes one block of raw text.
    ///
    /// Fails with [`Wa2csvError::MalformedBlock`] when `block` does not match
    /// `pattern`.
    pub fn decode(block: &str, pattern: &Pattern) -> Result<Self> {
        let (timestamp, rest) = pattern
            .split(block)
            .ok_or_else(|| Wa2csvError::malformed_block(block))?;

        Ok(match split_author(rest) {
            Some((author, content)) => Record::new(timestamp, author, content),
            None => Record::notification(timestamp, rest),
        })
    }

    /// Date portion of the timestamp (text before the first `", "` or space).
    pub fn date_part(&self) -> &str {
        self.split_timestamp().0
    }

    /// Time portion of the timestamp (text after the date portion).
    pub fn time_part(&self) -> &str {
        self.split_timestamp().1
    }

    fn split_timestamp(&self) -> (&str, &str) {
        let ts = self.timestamp.as_str();
        if let Some((date, time)) = ts.split_once(", ") {
            return (date, time);
        }
        ts.split_once(' ').unwrap_or((ts, ""))
    }
}

/// Splits a leading `Author: ` prefix off `content`.
///
/// Returns `None` for system notifications, which carry no prefix.
pub fn split_author(content: &str) -> Option<(&str, &str)> {
    let caps = AUTHOR_PREFIX.captures(content)?;
    let author = caps.get(1)?;
    let whole = caps.get(0)?;
    Some((author.as_str(), &content[whole.end()..]))
}
