//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputStyle`] - Legacy delimited text or quoted CSV
//! - [`Column`] - Selectable output columns
//!
//! [`Args::parser_config`] and [`Args::fields`] turn parsed arguments into
//! library types, so the binary stays a thin shell.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{DateFormatConfig, ParserConfig};
use crate::output::{BuiltinField, Field};

/// Convert WhatsApp TXT chat exports into CSV.
#[derive(Parser, Debug, Clone)]
#[command(name = "wa2csv")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    wa2csv chat.txt
    wa2csv chat.txt -m -o chat.csv
    wa2csv chat.txt --input-format 'DD/MM/YY, HH:mm' --output-format 'YYYY-MM-DD HH:mm'
    wa2csv chat.txt -t --timezone Asia/Jerusalem --columns date,hour,author,epoch
    wa2csv chat.txt --style quoted")]
pub struct Args {
    /// Path to the exported chat
    pub input: PathBuf,

    /// Path to output file (default: input path with a .csv extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Reassemble messages spanning several lines
    #[arg(short, long)]
    pub multiline: bool,

    /// Record-start regex with a timestamp group and a content group
    #[arg(short, long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Date format of the raw timestamps (e.g. 'DD/MM/YY, HH:mm')
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<String>,

    /// Date format to rewrite timestamps with
    #[arg(long, value_name = "FORMAT", requires = "input_format")]
    pub output_format: Option<String>,

    /// IANA timezone the timestamps were written in
    #[arg(short = 'z', long, value_name = "ZONE")]
    pub timezone: Option<String>,

    /// Compute epoch milliseconds for every record
    #[arg(short = 't', long)]
    pub timestamp: bool,

    /// Output columns, in order
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub columns: Vec<Column>,

    /// Output style
    #[arg(short, long, value_enum, default_value = "legacy")]
    pub style: OutputStyle,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the parser configuration.
    pub fn parser_config(&self) -> ParserConfig {
        let mut config = ParserConfig::new()
            .with_multiline(self.multiline)
            .with_timestamp(self.timestamp);
        if let Some(pattern) = &self.pattern {
            config = config.with_pattern(pattern.clone());
        }
        if let Some(zone) = &self.timezone {
            config = config.with_timezone(zone.clone());
        }
        if let Some(input) = &self.input_format {
            let mut formats = DateFormatConfig::new(input.clone());
            formats.output.clone_from(&self.output_format);
            config = config.with_date_format(formats);
        }
        config
    }

    /// Selected columns; defaults to `date,hour,author,content` plus `epoch` with
    /// `--timestamp`.
    pub fn columns(&self) -> Vec<Column> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let mut columns = vec![Column::Date, Column::Hour, Column::Author, Column::Content];
        if self.timestamp {
            columns.push(Column::Epoch);
        }
        columns
    }

    /// Selected columns as serializer fields.
    pub fn fields(&self) -> Vec<Box<dyn Field>> {
        self.columns()
            .into_iter()
            .map(|c| Box::new(BuiltinField::from(c)) as Box<dyn Field>)
            .collect()
    }

    /// Output path, derived from the input path when not given.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("csv"))
    }

    /// Log filter directive for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// How cells are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Comma-joined cells, author and content in literal quotes, no escaping
    #[default]
    Legacy,

    /// RFC 4180 CSV, cells quoted only when needed
    Quoted,
}

impl std::fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStyle::Legacy => write!(f, "legacy"),
            OutputStyle::Quoted => write!(f, "quoted"),
        }
    }
}

/// Selectable output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Date,
    Hour,
    Author,
    Content,
    Epoch,
    Notification,
}

impl From<Column> for BuiltinField {
    fn from(column: Column) -> Self {
        match column {
            Column::Date => BuiltinField::Date,
            Column::Hour => BuiltinField::Hour,
            Column::Author => BuiltinField::Author,
            Column::Content => BuiltinField::Content,
            Column::Epoch => BuiltinField::Epoch,
            Column::Notification => BuiltinField::Notification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("wa2csv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["chat.txt"]);
        assert_eq!(args.output_path(), PathBuf::from("chat.csv"));
        assert_eq!(args.style, OutputStyle::Legacy);
        assert_eq!(
            args.columns(),
            [Column::Date, Column::Hour, Column::Author, Column::Content]
        );
        assert_eq!(args.log_level(), "warn");
        assert_eq!(args.parser_config(), ParserConfig::new());
    }

    #[test]
    fn test_full_config() {
        let args = parse(&[
            "chat.txt",
            "-m",
            "--input-format",
            "DD/MM/YY, HH:mm",
            "--output-format",
            "YYYY-MM-DD",
            "-z",
            "Asia/Jerusalem",
            "-t",
            "-vv",
        ]);
        let config = args.parser_config();
        assert!(config.multiline);
        assert!(config.timestamp);
        assert_eq!(config.timezone.as_deref(), Some("Asia/Jerusalem"));
        let formats = config.date_format.unwrap();
        assert_eq!(formats.input, "DD/MM/YY, HH:mm");
        assert_eq!(formats.output.as_deref(), Some("YYYY-MM-DD"));
        assert_eq!(args.columns().last(), Some(&Column::Epoch));
        assert_eq!(args.log_level(), "trace");
    }

    #[test]
    fn test_columns_list() {
        let args = parse(&["chat.txt", "--columns", "hour,author,notification"]);
        let names: Vec<String> = args.fields().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, ["hour", "author", "notification"]);
    }

    #[test]
    fn test_output_format_requires_input_format() {
        let result = Args::try_parse_from(["wa2csv", "chat.txt", "--output-format", "YYYY"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_style_display() {
        assert_eq!(OutputStyle::Quoted.to_string(), "quoted");
        let json = serde_json::to_string(&OutputStyle::Legacy).unwrap();
        assert_eq!(json, "\"legacy\"");
    }
}
