//! Timestamp normalization.
//!
//! Date formats are written with moment-style tokens (`DD/MM/YY HH:mm`) and
//! compiled to chrono strftime strings. Three operations are offered:
//!
//! - [`reformat`] re-emits a timestamp in another format
//! - [`to_epoch`] converts a timestamp to milliseconds since the UTC epoch,
//!   optionally reading the wall-clock time in an IANA timezone
//! - [`DateNormalizer`] applies both to records according to the parser
//!   configuration
//!
//! # Token grammar
//!
//! | Token | Meaning | Token | Meaning |
//! |-------|---------|-------|---------|
//! | `YYYY` | 4-digit year | `YY` | 2-digit year |
//! | `MM` / `M` | month, padded / unpadded | `DD` / `D` | day |
//! | `HH` / `H` | hour 0-23 | `hh` / `h` | hour 1-12 |
//! | `mm` / `m` | minute | `ss` / `s` | second |
//! | `SSS` | milliseconds | `A` / `a` | AM/PM, am/pm |
//! | `Z` / `ZZ` | offset `+02:00` / `+0200` | `[...]` | literal text |
//!
//! Any other character is literal.
//!
//! # Example
//!
//! ```
//! use wa2csv::date::{reformat, to_epoch};
//!
//! let out = reformat("27/02/14 06:29:21", "DD/MM/YY HH:mm:ss", "DD-MM-YYYY HH:mm")?;
//! assert_eq!(out, "27-02-2014 06:29");
//!
//! let utc = to_epoch("31/01/17 20:51:00", "DD/MM/YY HH:mm:ss", None)?;
//! let jerusalem = to_epoch("31/01/17 20:51:00", "DD/MM/YY HH:mm:ss", Some("Asia/Jerusalem"))?;
//! assert_eq!(utc - jerusalem, 2 * 60 * 60 * 1000);
//! # Ok::<(), wa2csv::Wa2csvError>(())
//! ```

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

use crate::config::ParserConfig;
use crate::error::{Result, Wa2csvError};
use crate::record::Record;

static MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([ap])\.\s?m\b\.?").expect("meridiem pattern compiles"));

/// Tokens ordered so that longer tokens win over their prefixes.
/// Each entry is `(token, parse specifier, display specifier)`.
const TOKENS: &[(&str, &str, &str)] = &[
    ("YYYY", "%Y", "%Y"),
    ("YY", "%y", "%y"),
    ("SSS", "%3f", "%3f"),
    ("MM", "%m", "%m"),
    ("M", "%m", "%-m"),
    ("DD", "%d", "%d"),
    ("D", "%d", "%-d"),
    ("HH", "%H", "%H"),
    ("H", "%H", "%-H"),
    ("hh", "%I", "%I"),
    ("h", "%I", "%-I"),
    ("mm", "%M", "%M"),
    ("m", "%M", "%-M"),
    ("ss", "%S", "%S"),
    ("s", "%S", "%-S"),
    ("ZZ", "%#z", "%z"),
    ("Z", "%#z", "%:z"),
    ("A", "%p", "%p"),
    ("a", "%p", "%P"),
];

const TIME_TOKENS: &[&str] = &["HH", "H", "hh", "h", "mm", "m", "ss", "s", "SSS"];

/// A compiled date format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    source: String,
    parse_spec: String,
    display_spec: String,
    has_time: bool,
    has_offset: bool,
    has_meridiem: bool,
}

impl DateFormat {
    /// Compiles a token format string.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut parse_spec = String::with_capacity(source.len() * 2);
        let mut display_spec = String::with_capacity(source.len() * 2);
        let mut has_time = false;
        let mut has_offset = false;
        let mut has_meridiem = false;

        let mut rest = source.as_str();
        while let Some(c) = rest.chars().next() {
            if c == '[' {
                let (literal, after) = match rest[1..].split_once(']') {
                    Some((literal, after)) => (literal, after),
                    None => (&rest[1..], ""),
                };
                push_literal(&mut parse_spec, &mut display_spec, literal);
                rest = after;
                continue;
            }

            if let Some(&(token, parse, display)) =
                TOKENS.iter().find(|(token, _, _)| rest.starts_with(token))
            {
                parse_spec.push_str(parse);
                display_spec.push_str(display);
                has_time |= TIME_TOKENS.contains(&token);
                has_offset |= token.starts_with('Z');
                has_meridiem |= token.eq_ignore_ascii_case("a");
                rest = &rest[token.len()..];
                continue;
            }

            push_literal(&mut parse_spec, &mut display_spec, &rest[..c.len_utf8()]);
            rest = &rest[c.len_utf8()..];
        }

        Self {
            source,
            parse_spec,
            display_spec,
            has_time,
            has_offset,
            has_meridiem,
        }
    }

    /// The token format this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the format carries a UTC offset.
    pub fn has_offset(&self) -> bool {
        self.has_offset
    }

    /// Parses `raw` strictly against this format.
    pub fn parse(&self, raw: &str) -> Result<ParsedDate> {
        let input = if self.has_meridiem {
            normalize_meridiem(raw)
        } else {
            Cow::Borrowed(raw)
        };
        let fail = |e: chrono::ParseError| Wa2csvError::date_parse(raw, &self.source, e.to_string());

        if self.has_offset {
            DateTime::parse_from_str(&input, &self.parse_spec)
                .map(ParsedDate::Offset)
                .map_err(fail)
        } else if self.has_time {
            NaiveDateTime::parse_from_str(&input, &self.parse_spec)
                .map(ParsedDate::Local)
                .map_err(fail)
        } else {
            NaiveDate::parse_from_str(&input, &self.parse_spec)
                .map(|d| ParsedDate::Local(d.and_time(NaiveTime::MIN)))
                .map_err(fail)
        }
    }

    /// Renders `date` with this format.
    ///
    /// Fails if the format needs an offset and `date` has none.
    pub fn format(&self, date: &ParsedDate) -> Result<String> {
        let mut out = String::new();
        let written = match date {
            ParsedDate::Local(naive) => write!(out, "{}", naive.format(&self.display_spec)),
            ParsedDate::Offset(dt) => write!(out, "{}", dt.format(&self.display_spec)),
        };
        written.map_err(|fmt::Error| {
            Wa2csvError::date_parse(
                date.to_string(),
                &self.source,
                "format needs a UTC offset the date does not carry",
            )
        })?;
        Ok(out)
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn push_literal(parse_spec: &mut String, display_spec: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '%' {
            parse_spec.push_str("%%");
            display_spec.push_str("%%");
        } else {
            parse_spec.push(c);
            display_spec.push(c);
        }
    }
}

/// Rewrites `a.m.`/`p.m.` markers as `AM`/`PM`.
fn normalize_meridiem(raw: &str) -> Cow<'_, str> {
    MERIDIEM.replace_all(raw, |caps: &regex::Captures<'_>| {
        format!("{}M", caps[1].to_ascii_uppercase())
    })
}

/// A parsed timestamp, with or without a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// Wall-clock time with no zone information.
    Local(NaiveDateTime),
    /// Time with an explicit UTC offset.
    Offset(DateTime<FixedOffset>),
}

impl ParsedDate {
    /// Milliseconds since the UTC epoch.
    ///
    /// An explicit offset always wins. Wall-clock times are read in
    /// `timezone`, or as UTC when no timezone is given. Ambiguous times
    /// resolve to the earlier instant; times in a DST gap move forward
    /// one hour.
    pub fn epoch_millis(&self, timezone: Option<&Tz>) -> Result<i64> {
        match (self, timezone) {
            (ParsedDate::Offset(dt), _) => Ok(dt.timestamp_millis()),
            (ParsedDate::Local(naive), None) => Ok(naive.and_utc().timestamp_millis()),
            (ParsedDate::Local(naive), Some(tz)) => tz
                .from_local_datetime(naive)
                .earliest()
                .or_else(|| {
                    tz.from_local_datetime(&(*naive + TimeDelta::hours(1)))
                        .earliest()
                })
                .map(|dt| dt.timestamp_millis())
                .ok_or_else(|| {
                    Wa2csvError::date_parse(
                        naive.to_string(),
                        tz.name(),
                        "local time does not exist in this timezone",
                    )
                }),
        }
    }
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedDate::Local(naive) => write!(f, "{naive}"),
            ParsedDate::Offset(dt) => write!(f, "{dt}"),
        }
    }
}

/// Resolves an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| Wa2csvError::invalid_timezone(name))
}

/// Parses `raw` with `input` and re-emits it with `output`.
pub fn reformat(raw: &str, input: &str, output: &str) -> Result<String> {
    let parsed = DateFormat::new(input).parse(raw)?;
    DateFormat::new(output).format(&parsed)
}

/// Converts `raw` to milliseconds since the UTC epoch.
///
/// With `timezone`, an offset-less `raw` is read as wall-clock time in that
/// zone. Without it, an offset-less `raw` is read as UTC.
pub fn to_epoch(raw: &str, format: &str, timezone: Option<&str>) -> Result<i64> {
    let tz = timezone.map(parse_timezone).transpose()?;
    DateFormat::new(format).parse(raw)?.epoch_millis(tz.as_ref())
}

/// Applies the configured date normalization to records.
///
/// Parse failures never abort a parse: the raw timestamp is kept, the record
/// is flagged with `invalid_date` and a warning is logged.
#[derive(Debug, Clone, Default)]
pub struct DateNormalizer {
    input: Option<DateFormat>,
    output: Option<DateFormat>,
    timezone: Option<Tz>,
    timestamp: bool,
}

impl DateNormalizer {
    /// Builds a normalizer from parser configuration.
    ///
    /// Fails if the configured timezone is unknown.
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        let timezone = config
            .timezone
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(parse_timezone)
            .transpose()?;
        let (input, output) = match &config.date_format {
            Some(formats) => (
                Some(DateFormat::new(formats.input.as_str())),
                formats.output.as_deref().map(DateFormat::new),
            ),
            None => (None, None),
        };
        Ok(Self {
            input,
            output,
            timezone,
            timestamp: config.timestamp,
        })
    }

    /// Returns `true` if applying this normalizer can change a record.
    pub fn is_active(&self) -> bool {
        (self.input.is_some() && self.output.is_some()) || self.timestamp
    }

    /// Normalizes `record` in place.
    ///
    /// `implied` is the active pattern's date format, used for timestamping
    /// when no format is configured.
    pub fn apply(&self, record: &mut Record, implied: Option<&DateFormat>) {
        if let (Some(input), Some(output)) = (&self.input, &self.output) {
            match input.parse(&record.timestamp).and_then(|d| output.format(&d)) {
                Ok(formatted) => record.timestamp = formatted,
                Err(e) => {
                    warn!(timestamp = %record.timestamp, error = %e, "leaving timestamp unformatted");
                    record.invalid_date = true;
                    return;
                }
            }
        }

        if !self.timestamp {
            return;
        }

        let Some(format) = self.output.as_ref().or(self.input.as_ref()).or(implied) else {
            warn!("timestamp requested but no date format is known for this pattern");
            return;
        };
        match format
            .parse(&record.timestamp)
            .and_then(|d| d.epoch_millis(self.timezone.as_ref()))
        {
            Ok(epoch) => record.timestamp_epoch = Some(epoch),
            Err(e) => {
                warn!(timestamp = %record.timestamp, error = %e, "cannot compute epoch");
                record.invalid_date = true;
            }
        }
    }
}
