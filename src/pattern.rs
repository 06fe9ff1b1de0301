//! Record-start patterns and format auto-detection.
//!
//! WhatsApp exports changed their timestamp layout several times. Each
//! historical layout is a [`BuiltinPattern`]; a [`PatternRegistry`] holds them
//! in priority order and picks the first one that matches a line.
//!
//! Supported formats:
//! - `27/02/14, 06:29 - Steve: We won.`
//! - `27/02/2014, 6:29 p.m. - Steve: We won.`
//! - `27-02-14 06:29:21: Steve: We won.`

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, Wa2csvError};

/// Historically observed WhatsApp export layouts, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinPattern {
    /// Two-digit year, 24-hour clock, ` - ` separator.
    /// Example: `27/02/14, 06:29 - Steve: We won.`
    TwoDigitYear24h,
    /// Four-digit year, 12-hour clock with `a.m.`/`p.m.` markers.
    /// Example: `27/02/2014, 6:29 p.m. - Steve: We won.`
    FourDigitYear12h,
    /// Dashed date with seconds, colon separator.
    /// Example: `27-02-14 06:29:21: Steve: We won.`
    DashedSeconds,
}

impl BuiltinPattern {
    /// Returns the regex source for this layout.
    ///
    /// Group 1 is the timestamp, group 2 the content. Content spans newlines
    /// so that an aggregated multi-line block still matches.
    pub fn regex_source(self) -> &'static str {
        match self {
            BuiltinPattern::TwoDigitYear24h => r"(?s)^(\d\d/\d\d/\d\d, \d\d:\d\d) - (.+)",
            BuiltinPattern::FourDigitYear12h => {
                r"(?is)^(\d\d/\d\d/\d\d\d\d, \d\d?:\d\d? [ap]\.m\.?) - (.+)"
            }
            BuiltinPattern::DashedSeconds => r"(?s)^(\d\d-\d\d-\d\d \d\d:\d\d:\d\d): (.+)",
        }
    }

    /// Returns the date format implied by the timestamp group.
    pub fn date_format(self) -> &'static str {
        match self {
            BuiltinPattern::TwoDigitYear24h => "DD/MM/YY, HH:mm",
            BuiltinPattern::FourDigitYear12h => "DD/MM/YYYY, h:mm A",
            BuiltinPattern::DashedSeconds => "DD-MM-YY HH:mm:ss",
        }
    }

    /// Returns all layouts in priority order.
    pub fn all() -> &'static [BuiltinPattern] {
        &[
            BuiltinPattern::TwoDigitYear24h,
            BuiltinPattern::FourDigitYear12h,
            BuiltinPattern::DashedSeconds,
        ]
    }
}

impl fmt::Display for BuiltinPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinPattern::TwoDigitYear24h => write!(f, "DD/MM/YY, HH:mm"),
            BuiltinPattern::FourDigitYear12h => write!(f, "DD/MM/YYYY, h:mm a.m."),
            BuiltinPattern::DashedSeconds => write!(f, "DD-MM-YY HH:mm:ss"),
        }
    }
}

/// A record-start matcher.
///
/// Splits a matching text into a timestamp substring (group 1) and a content
/// substring (group 2). Custom patterns must make group 2 span newlines
/// (`[\s\S]+` or the `s` flag) to be usable in multi-line mode.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    date_format: Option<String>,
    builtin: Option<BuiltinPattern>,
}

impl Pattern {
    /// Compiles a custom pattern from a regex with two capture groups.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wa2csv::Pattern;
    ///
    /// let pattern = Pattern::new(r"^(\d\d/\d\d/\d\d \d\d:\d\d:\d\d): ([\s\S]+)")?;
    /// assert!(pattern.is_match("27/02/14 06:29:21: Steve Rogers: We won."));
    /// # Ok::<(), wa2csv::Wa2csvError>(())
    /// ```
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| Wa2csvError::invalid_pattern(e.to_string()))?;
        Self::from_regex(regex)
    }

    /// Wraps an already compiled regex.
    pub fn from_regex(regex: Regex) -> Result<Self> {
        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 3 {
            return Err(Wa2csvError::invalid_pattern(format!(
                "'{}' needs a timestamp group and a content group",
                regex.as_str()
            )));
        }
        Ok(Self {
            regex,
            date_format: None,
            builtin: None,
        })
    }

    /// Returns the shared instance of a built-in layout.
    pub fn builtin(kind: BuiltinPattern) -> Self {
        let index = BuiltinPattern::all()
            .iter()
            .position(|&k| k == kind)
            .unwrap_or_default();
        BUILTIN_REGISTRY.patterns[index].clone()
    }

    /// Attaches the date format implied by the timestamp group.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Returns `true` if `text` starts a record.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Splits `text` into `(timestamp, content)`.
    pub fn split<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        let caps = self.regex.captures(text)?;
        let timestamp = caps.get(1)?.as_str();
        let content = caps.get(2)?.as_str();
        Some((timestamp, content))
    }

    /// The regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// The implied date format, if known.
    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    /// The built-in layout this pattern was created from, if any.
    pub fn kind(&self) -> Option<BuiltinPattern> {
        self.builtin
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.date_format == other.date_format
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin {
            Some(kind) => write!(f, "{kind}"),
            None => write!(f, "/{}/", self.regex.as_str()),
        }
    }
}

/// Ordered set of record-start patterns.
///
/// Detection is first-match in list order, so list order is the tie-break
/// when a line satisfies more than one pattern.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    patterns: Vec<Pattern>,
}

static BUILTIN_REGISTRY: LazyLock<PatternRegistry> = LazyLock::new(|| PatternRegistry {
    patterns: BuiltinPattern::all()
        .iter()
        .map(|&kind| Pattern {
            regex: Regex::new(kind.regex_source()).expect("built-in pattern compiles"),
            date_format: Some(kind.date_format().to_string()),
            builtin: Some(kind),
        })
        .collect(),
});

impl PatternRegistry {
    /// Returns the registry of built-in layouts.
    pub fn builtin() -> Self {
        BUILTIN_REGISTRY.clone()
    }

    /// Creates a registry with a custom priority order.
    pub fn with_patterns(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Returns the first pattern matching `line`.
    pub fn detect(&self, line: &str) -> Option<&Pattern> {
        let found = self.patterns.iter().find(|p| p.is_match(line));
        match found {
            Some(pattern) => debug!(%pattern, "detected record pattern"),
            None => debug!(line, "no record pattern matches"),
        }
        found
    }

    /// The patterns in priority order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Detects the built-in layout of `line`.
pub fn detect_pattern(line: &str) -> Option<Pattern> {
    BUILTIN_REGISTRY.detect(line).cloned()
}
