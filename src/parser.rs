//! Streaming chat-log parser.
//!
//! [`ChatLogParser`] holds configuration and transforms. Each parse runs in
//! its own [`ParseSession`], which owns the only mutable state: the active
//! pattern and the open block. Sessions never share state, so independent
//! inputs can be parsed in parallel with one parser.
//!
//! Control flow per line: [`LineAggregator`] → [`Record::decode`] →
//! [`DateNormalizer`] → [`TransformPipeline`].
//!
//! # Example
//!
//! ```rust
//! use wa2csv::ChatLogParser;
//!
//! let parser = ChatLogParser::new()
//!     .multiline(true)
//!     .format("DD/MM/YY, HH:mm", "YYYY-MM-DD HH:mm")
//!     .timestamp(true);
//!
//! let records = parser.parse_str(
//!     "27/02/14, 06:29 - Steve: We won.\nTruly.\n28/02/14, 07:00 - Tony: OK",
//! )?;
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].content, "We won.\nTruly.");
//! assert_eq!(records[0].timestamp, "2014-02-27 06:29");
//! assert_eq!(records[1].timestamp_epoch, Some(1393570800000));
//! # Ok::<(), wa2csv::Wa2csvError>(())
//! ```
//!
//! # Streaming
//!
//! ```rust,no_run
//! use wa2csv::ChatLogParser;
//!
//! let parser = ChatLogParser::new().multiline(true);
//! for result in parser.stream_file("huge_chat.txt")? {
//!     let record = result?;
//!     println!("{}: {}", record.author, record.content);
//! }
//! # Ok::<(), wa2csv::Wa2csvError>(())
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::aggregator::{LineAggregator, LineMode};
use crate::config::{DateFormatConfig, ParserConfig};
use crate::date::{DateFormat, DateNormalizer};
use crate::error::{BoxError, Result, Wa2csvError};
use crate::pattern::Pattern;
use crate::record::Record;
use crate::transform::{Transform, TransformPipeline};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Parser for WhatsApp TXT exports.
///
/// Built with chained setters; every parse call starts a fresh session.
#[derive(Debug, Default)]
pub struct ChatLogParser {
    config: ParserConfig,
    pattern: Option<Pattern>,
    transforms: TransformPipeline,
}

impl ChatLogParser {
    /// Creates a parser with default configuration: auto-detected pattern,
    /// single-line mode, no date handling, no transforms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Uses `pattern` instead of auto-detection.
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets the date formats used to reformat timestamps.
    #[must_use]
    pub fn format(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.config.date_format = Some(DateFormatConfig::new(input).with_output(output));
        self
    }

    /// Attaches `timestamp_epoch` to records.
    #[must_use]
    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.config.timestamp = enabled;
        self
    }

    /// Reads wall-clock timestamps in an IANA timezone.
    #[must_use]
    pub fn timezone(mut self, zone: impl Into<String>) -> Self {
        self.config.timezone = Some(zone.into());
        self
    }

    /// Enables or disables multi-line mode.
    #[must_use]
    pub fn multiline(mut self, enabled: bool) -> Self {
        self.config.multiline = enabled;
        self
    }

    /// Shortcut for `multiline(false)`.
    #[must_use]
    pub fn singleline(self) -> Self {
        self.multiline(false)
    }

    /// Appends a fallible record transform.
    #[must_use]
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Record) -> std::result::Result<Record, BoxError> + Send + Sync + 'static,
    {
        self.transforms.push(f);
        self
    }

    /// Appends an infallible record transform.
    #[must_use]
    pub fn map<F>(mut self, f: F) -> Self
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.transforms.map(f);
        self
    }

    /// Appends a transform object.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Starts a new parse session.
    ///
    /// Fails early on an invalid pattern or timezone, before any input is read.
    pub fn session(&self) -> Result<ParseSession<'_>> {
        let mode = LineMode::from_multiline(self.config.multiline);
        let pattern = match (&self.pattern, &self.config.pattern) {
            (Some(pattern), _) => Some(pattern.clone()),
            (None, Some(source)) => Some(Pattern::new(source)?),
            (None, None) => None,
        };
        let aggregator = match pattern {
            Some(pattern) => LineAggregator::with_pattern(mode, pattern),
            None => LineAggregator::new(mode),
        };

        Ok(ParseSession {
            aggregator,
            normalizer: DateNormalizer::from_config(&self.config)?,
            implied_format: None,
            transforms: &self.transforms,
            emitted: 0,
            halted: false,
        })
    }

    /// Parses a sequence of lines.
    pub fn parse_lines<I, S>(&self, lines: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = self.session()?;
        let mut records = Vec::new();
        for line in lines {
            records.extend(session.feed(line.as_ref())?);
        }
        records.extend(session.finish()?);
        Ok(records)
    }

    /// Parses an in-memory export.
    pub fn parse_str(&self, content: &str) -> Result<Vec<Record>> {
        self.parse_lines(content.lines())
    }

    /// Parses an export from a buffered reader.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Vec<Record>> {
        self.records(reader)?.collect()
    }

    /// Parses an export file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        self.stream_file(path)?.collect()
    }

    /// Lazily parses records from a buffered reader.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD instead of failing the parse.
    pub fn records<R: BufRead>(&self, reader: R) -> Result<RecordIter<'_, LossyLines<R>>> {
        Ok(RecordIter {
            lines: Some(LossyLines::new(reader)),
            session: self.session()?,
        })
    }

    /// Lazily parses records from a file.
    pub fn stream_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<RecordIter<'_, LossyLines<BufReader<File>>>> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening chat export");
        let file = File::open(path)?;
        self.records(BufReader::with_capacity(READ_BUFFER_SIZE, file))
    }
}

/// State of one parse.
///
/// Feed lines in order with [`feed`](Self::feed), then call
/// [`finish`](Self::finish) at end of input. After any error the session is
/// halted and ignores further input.
#[derive(Debug)]
pub struct ParseSession<'p> {
    aggregator: LineAggregator,
    normalizer: DateNormalizer,
    implied_format: Option<DateFormat>,
    transforms: &'p TransformPipeline,
    emitted: usize,
    halted: bool,
}

impl ParseSession<'_> {
    /// Consumes one line and returns the record it completed, if any.
    pub fn feed(&mut self, line: &str) -> Result<Option<Record>> {
        if self.halted {
            return Ok(None);
        }
        let result = self
            .aggregator
            .push(line)
            .and_then(|block| block.map(|b| self.complete(&b)).transpose());
        self.halted = result.is_err();
        result
    }

    /// Flushes the open block at end of input.
    pub fn finish(&mut self) -> Result<Option<Record>> {
        if self.halted {
            return Ok(None);
        }
        self.halted = true;
        let record = self
            .aggregator
            .finish()
            .map(|b| self.complete(&b))
            .transpose()?;
        info!(
            records = self.emitted,
            pattern = %self.pattern().map(ToString::to_string).unwrap_or_default(),
            "parse session finished"
        );
        Ok(record)
    }

    /// The active pattern, once detected or supplied.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.aggregator.pattern()
    }

    /// Number of records produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn complete(&mut self, block: &str) -> Result<Record> {
        let Some(pattern) = self.aggregator.pattern() else {
            return Err(Wa2csvError::malformed_block(block));
        };
        if self.implied_format.is_none() {
            self.implied_format = pattern.date_format().map(DateFormat::new);
        }

        let mut record = Record::decode(block, pattern)?;
        if self.normalizer.is_active() {
            self.normalizer
                .apply(&mut record, self.implied_format.as_ref());
        }
        let record = self.transforms.apply(record)?;
        self.emitted += 1;
        Ok(record)
    }
}

/// Line source over a buffered reader.
///
/// Splits on `\n` and decodes each line as UTF-8, replacing invalid bytes
/// with U+FFFD. Only read errors are returned as `Err`.
pub struct LossyLines<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None, // EOF
            Ok(_) => {
                self.line_number += 1;
                if self.buffer.last() == Some(&b'\n') {
                    self.buffer.pop();
                }
                let line = match String::from_utf8(std::mem::take(&mut self.buffer)) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(line = self.line_number, "replacing invalid UTF-8 bytes");
                        String::from_utf8_lossy(e.as_bytes()).into_owned()
                    }
                };
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Lazy record iterator over a line source.
///
/// Yields at most one error; the line source is dropped as soon as an error
/// occurs or input ends.
pub struct RecordIter<'p, I> {
    lines: Option<I>,
    session: ParseSession<'p>,
}

impl<I> RecordIter<'_, I> {
    /// The active pattern, once detected or supplied.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.session.pattern()
    }
}

impl<I, S> Iterator for RecordIter<'_, I>
where
    I: Iterator<Item = io::Result<S>>,
    S: AsRef<str>,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let lines = self.lines.as_mut()?;
            match lines.next() {
                Some(Ok(line)) => match self.session.feed(line.as_ref()) {
                    Ok(Some(record)) => return Some(Ok(record)),
                    Ok(None) => {}
                    Err(e) => {
                        self.lines = None;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.lines = None;
                    return Some(Err(e.into()));
                }
                None => {
                    self.lines = None;
                    return self.session.finish().transpose();
                }
            }
        }
    }
}
