//! Line-by-line reassembly of logical records.
//!
//! The aggregator classifies each incoming line as a record start or a
//! continuation and holds at most one open block. It never buffers more than
//! that block, so arbitrarily large exports stream in constant memory
//! (bounded by the longest message).

use tracing::debug;

use crate::error::{Result, Wa2csvError};
use crate::pattern::{Pattern, PatternRegistry};

/// How lines map to records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    /// One record per matching line; other lines are discarded.
    #[default]
    SingleLine,
    /// Non-matching lines are appended to the open record.
    MultiLine,
}

impl LineMode {
    /// Maps the `multiline` configuration flag to a mode.
    pub fn from_multiline(multiline: bool) -> Self {
        if multiline {
            LineMode::MultiLine
        } else {
            LineMode::SingleLine
        }
    }
}

/// Reassembles record blocks from a line sequence.
///
/// # Example
///
/// ```
/// use wa2csv::aggregator::{LineAggregator, LineMode};
///
/// let mut aggregator = LineAggregator::new(LineMode::MultiLine);
/// assert_eq!(aggregator.push("27/02/14, 06:29 - Steve: We won.")?, None);
/// assert_eq!(aggregator.push("Truly.")?, None);
/// assert_eq!(
///     aggregator.push("28/02/14, 07:00 - Tony: OK")?.as_deref(),
///     Some("27/02/14, 06:29 - Steve: We won.\nTruly.")
/// );
/// assert_eq!(aggregator.finish().as_deref(), Some("28/02/14, 07:00 - Tony: OK"));
/// # Ok::<(), wa2csv::Wa2csvError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LineAggregator {
    registry: PatternRegistry,
    pattern: Option<Pattern>,
    mode: LineMode,
    open_block: Option<String>,
}

impl LineAggregator {
    /// Creates an aggregator that detects its pattern from the input.
    pub fn new(mode: LineMode) -> Self {
        Self {
            registry: PatternRegistry::builtin(),
            pattern: None,
            mode,
            open_block: None,
        }
    }

    /// Creates an aggregator with a fixed pattern.
    pub fn with_pattern(mode: LineMode, pattern: Pattern) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::new(mode)
        }
    }

    /// Replaces the registry used for detection.
    #[must_use]
    pub fn with_registry(mut self, registry: PatternRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The active pattern, once detected or supplied.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// The line mode.
    pub fn mode(&self) -> LineMode {
        self.mode
    }

    /// Consumes one line and returns the block it completed, if any.
    ///
    /// The first non-blank line fixes the pattern when none was supplied.
    /// Fails with [`Wa2csvError::PatternNotFound`] when that line matches no
    /// known pattern.
    pub fn push(&mut self, line: &str) -> Result<Option<String>> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if self.pattern.is_none() {
            if line.trim().is_empty() {
                return Ok(None);
            }
            let detected = self
                .registry
                .detect(line)
                .cloned()
                .ok_or_else(|| Wa2csvError::pattern_not_found(line))?;
            self.pattern = Some(detected);
        }

        let is_start = self.pattern.as_ref().is_some_and(|p| p.is_match(line));

        match self.mode {
            LineMode::SingleLine => Ok(is_start.then(|| line.to_string())),
            LineMode::MultiLine if is_start => {
                let completed = self.take_block();
                self.open_block = Some(line.to_string());
                Ok(completed)
            }
            LineMode::MultiLine => {
                match &mut self.open_block {
                    Some(block) => {
                        block.push('\n');
                        block.push_str(line);
                    }
                    None => debug!(line, "dropping line before first record"),
                }
                Ok(None)
            }
        }
    }

    /// Flushes the open block at end of input.
    pub fn finish(&mut self) -> Option<String> {
        match self.mode {
            LineMode::SingleLine => None,
            LineMode::MultiLine => self.take_block(),
        }
    }

    fn take_block(&mut self) -> Option<String> {
        self.open_block.take().filter(|b| !b.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(mode: LineMode, lines: &[&str]) -> Result<Vec<String>> {
        let mut aggregator = LineAggregator::new(mode);
        let mut blocks = Vec::new();
        for line in lines {
            blocks.extend(aggregator.push(line)?);
        }
        blocks.extend(aggregator.finish());
        Ok(blocks)
    }

    #[test]
    fn test_multiline_reassembly() {
        let blocks = collect(
            LineMode::MultiLine,
            &[
                "27/02/14, 06:29 - Steve: We won.",
                "Truly.",
                "28/02/14, 07:00 - Tony: OK",
            ],
        )
        .unwrap();
        assert_eq!(
            blocks,
            vec![
                "27/02/14, 06:29 - Steve: We won.\nTruly.",
                "28/02/14, 07:00 - Tony: OK",
            ]
        );
    }

    #[test]
    fn test_singleline_discards_continuations() {
        let blocks = collect(
            LineMode::SingleLine,
            &[
                "27/02/14, 06:29 - Steve: We won.",
                "Truly.",
                "28/02/14, 07:00 - Tony: OK",
            ],
        )
        .unwrap();
        assert_eq!(
            blocks,
            vec!["27/02/14, 06:29 - Steve: We won.", "28/02/14, 07:00 - Tony: OK"]
        );
    }

    #[test]
    fn test_pattern_not_found() {
        let err = collect(LineMode::MultiLine, &["hello", "27/02/14, 06:29 - Steve: hi"])
            .unwrap_err();
        assert!(err.is_pattern_not_found());
    }

    #[test]
    fn test_leading_blank_lines_skip_detection() {
        let blocks =
            collect(LineMode::MultiLine, &["", "   ", "27/02/14, 06:29 - Steve: hi"]).unwrap();
        assert_eq!(blocks, vec!["27/02/14, 06:29 - Steve: hi"]);
    }

    #[test]
    fn test_blank_continuation_is_kept() {
        let blocks = collect(
            LineMode::MultiLine,
            &["27/02/14, 06:29 - Steve: a", "", "b"],
        )
        .unwrap();
        assert_eq!(blocks, vec!["27/02/14, 06:29 - Steve: a\n\nb"]);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let blocks = collect(
            LineMode::MultiLine,
            &["27/02/14, 06:29 - Steve: a\r", "b\r"],
        )
        .unwrap();
        assert_eq!(blocks, vec!["27/02/14, 06:29 - Steve: a\nb"]);
    }

    #[test]
    fn test_orphan_lines_with_explicit_pattern() {
        let pattern = Pattern::new(r"^(\d\d/\d\d/\d\d \d\d:\d\d:\d\d): ([\s\S]+)").unwrap();
        let mut aggregator = LineAggregator::with_pattern(LineMode::MultiLine, pattern);
        assert_eq!(aggregator.push("preamble").unwrap(), None);
        assert_eq!(aggregator.push("27/02/14 06:29:21: Steve: hi").unwrap(), None);
        assert_eq!(
            aggregator.finish().as_deref(),
            Some("27/02/14 06:29:21: Steve: hi")
        );
    }

    #[test]
    fn test_pattern_is_fixed_after_detection() {
        let mut aggregator = LineAggregator::new(LineMode::MultiLine);
        aggregator.push("27/02/14, 06:29 - Steve: hi").unwrap();
        // a line in another built-in layout is a continuation, not a new record
        assert_eq!(aggregator.push("27-02-14 06:29:21: Tony: hey").unwrap(), None);
        assert_eq!(
            aggregator.finish().as_deref(),
            Some("27/02/14, 06:29 - Steve: hi\n27-02-14 06:29:21: Tony: hey")
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(collect(LineMode::MultiLine, &[]).unwrap().is_empty());
        assert!(collect(LineMode::SingleLine, &[]).unwrap().is_empty());
    }
}
