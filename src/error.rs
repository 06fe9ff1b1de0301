//! Unified error types for wa2csv.
//!
//! This module provides a single [`Wa2csvError`] enum that covers every
//! failure the engine can surface. Parsing failures are never retried
//! internally; only output failures ([`Wa2csvError::Io`] while writing)
//! are worth retrying, and that decision is left to the caller.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging

use std::io;

use thiserror::Error;

/// Boxed error type returned by user-supplied transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized [`Result`] type for wa2csv operations.
///
/// # Example
///
/// ```rust
/// use wa2csv::error::Result;
/// use wa2csv::Record;
///
/// fn my_function() -> Result<Vec<Record>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, Wa2csvError>;

/// The error type for all wa2csv operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Wa2csvError {
    /// An I/O error occurred.
    ///
    /// Raised when the input file cannot be read, or when the output sink
    /// fails to write the serialized text.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No known record pattern matches the input.
    ///
    /// Fatal to the parse session: no further lines are consumed.
    #[error("Could not parse - record pattern not found (first line: {line:?})")]
    PatternNotFound {
        /// The line detection was attempted on
        line: String,
    },

    /// A completed block does not match the active pattern.
    #[error("Malformed record block: {block:?}")]
    MalformedBlock {
        /// The raw block text
        block: String,
    },

    /// A user-supplied record pattern is unusable.
    #[error("Invalid record pattern: {0}")]
    InvalidPattern(String),

    /// The configured timezone is not a known IANA zone name.
    #[error("Unknown timezone '{name}'")]
    InvalidTimezone {
        /// The name that failed to resolve
        name: String,
    },

    /// A timestamp does not conform to the date format it was parsed with.
    #[error("Cannot parse date '{input}' with format '{format}': {reason}")]
    DateParse {
        /// The raw timestamp string
        input: String,
        /// The token format it was parsed against
        format: String,
        /// What went wrong
        reason: String,
    },

    /// A transform in the pipeline failed. The whole parse is aborted.
    #[error("Transform #{index} failed: {source}")]
    Transform {
        /// Position of the failing transform in registration order
        index: usize,
        /// The error returned by the transform
        #[source]
        source: BoxError,
    },

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Wa2csvError {
    /// Creates a pattern-not-found error.
    pub fn pattern_not_found(line: impl Into<String>) -> Self {
        Wa2csvError::PatternNotFound { line: line.into() }
    }

    /// Creates a malformed block error.
    pub fn malformed_block(block: impl Into<String>) -> Self {
        Wa2csvError::MalformedBlock {
            block: block.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Wa2csvError::InvalidPattern(message.into())
    }

    /// Creates an invalid timezone error.
    pub fn invalid_timezone(name: impl Into<String>) -> Self {
        Wa2csvError::InvalidTimezone { name: name.into() }
    }

    /// Creates a date parse error.
    pub fn date_parse(
        input: impl Into<String>,
        format: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Wa2csvError::DateParse {
            input: input.into(),
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, Wa2csvError::Io(_))
    }

    /// Returns `true` if no record pattern could be detected.
    pub fn is_pattern_not_found(&self) -> bool {
        matches!(self, Wa2csvError::PatternNotFound { .. })
    }

    /// Returns `true` if a block failed to decode.
    pub fn is_malformed_block(&self) -> bool {
        matches!(self, Wa2csvError::MalformedBlock { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_date_parse(&self) -> bool {
        matches!(self, Wa2csvError::DateParse { .. })
    }

    /// Returns `true` if a transform aborted the parse.
    pub fn is_transform(&self) -> bool {
        matches!(self, Wa2csvError::Transform { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_display() {
        let err = Wa2csvError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_pattern_not_found_display() {
        let err = Wa2csvError::pattern_not_found("hello world");
        assert!(err.is_pattern_not_found());
        assert!(err.to_string().contains("record pattern not found"));
        assert!(err.to_string().contains("hello world"));
    }

    #[test]
    fn test_date_parse_display() {
        let err = Wa2csvError::date_parse("31/13/17", "DD/MM/YY", "input is out of range");
        let display = err.to_string();
        assert!(display.contains("31/13/17"));
        assert!(display.contains("DD/MM/YY"));
        assert!(err.is_date_parse());
        assert!(!err.is_io());
    }

    #[test]
    fn test_transform_error_source_chain() {
        let err = Wa2csvError::Transform {
            index: 2,
            source: "boom".into(),
        };
        assert!(err.is_transform());
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Transform #2 failed: boom");
    }

    #[test]
    fn test_is_methods() {
        let err = Wa2csvError::malformed_block("garbage");
        assert!(err.is_malformed_block());
        assert!(!err.is_pattern_not_found());
        assert!(!err.is_transform());

        let err = Wa2csvError::invalid_timezone("Mars/Olympus");
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Wa2csvError = io_err.into();
        assert!(err.is_io());
        assert!(err.source().is_some());
    }
}
