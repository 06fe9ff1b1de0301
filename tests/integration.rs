//! Integration tests for the parser with real files

use std::fs;
use std::io::Cursor;

use tempfile::{TempDir, tempdir};
use wa2csv::output::{BuiltinField, Field, field};
use wa2csv::pattern::BuiltinPattern;
use wa2csv::prelude::*;

fn fixtures() -> TempDir {
    let dir = tempdir().unwrap();

    // Two-digit year, 24h, with a multi-line message and a notification
    let android = "27/02/14, 06:29 - Steve: We won.
Truly.
27/02/14, 06:30 - Tony Stark was added
28/02/14, 07:00 - Tony: OK
28/02/14, 07:01 - Natasha: See you at 10:30: sharp";
    fs::write(dir.path().join("android.txt"), android).unwrap();

    // Four-digit year, 12h with localized markers, CRLF line endings
    let meridiem = "27/02/2014, 6:29 p.m. - Steve: We won.\r\n\
                    27/02/2014, 6:31 p.m. - Tony: OK\r\n\
                    28/02/2014, 12:05 a.m. - Natasha: Late night\r\n";
    fs::write(dir.path().join("meridiem.txt"), meridiem).unwrap();

    // Dashed date with seconds
    let dashed = "27-02-14 06:29:21: Steve: We won.
27-02-14 06:29:40: Bruce was removed";
    fs::write(dir.path().join("dashed.txt"), dashed).unwrap();

    fs::write(dir.path().join("unknown.txt"), "Hello\nWorld\n").unwrap();
    fs::write(dir.path().join("empty.txt"), "").unwrap();

    dir
}

#[test]
fn test_parse_file_multiline() {
    let dir = fixtures();
    let records = ChatLogParser::new()
        .multiline(true)
        .parse_file(dir.path().join("android.txt"))
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].author, "Steve");
    assert_eq!(records[0].content, "We won.\nTruly.");
    assert_eq!(records[1].author, "");
    assert!(records[1].is_notification);
    assert_eq!(records[1].content, "Tony Stark was added");
    assert_eq!(records[3].content, "See you at 10:30: sharp");
}

#[test]
fn test_parse_file_singleline_drops_continuations() {
    let dir = fixtures();
    let records = ChatLogParser::new()
        .parse_file(dir.path().join("android.txt"))
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].content, "We won.");
}

#[test]
fn test_meridiem_export_with_timestamps() {
    let dir = fixtures();
    let records = ChatLogParser::new()
        .format("DD/MM/YYYY, h:mm A", "YYYY-MM-DD HH:mm")
        .timestamp(true)
        .parse_file(dir.path().join("meridiem.txt"))
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].timestamp, "2014-02-27 18:29");
    assert_eq!(records[2].timestamp, "2014-02-28 00:05");
    assert_eq!(records[1].content, "OK");
    let gap = records[1].timestamp_epoch.unwrap() - records[0].timestamp_epoch.unwrap();
    assert_eq!(gap, 2 * 60 * 1000);
}

#[test]
fn test_dashed_export_detection() {
    let dir = fixtures();
    let parser = ChatLogParser::new();
    let mut iter = parser
        .stream_file(dir.path().join("dashed.txt"))
        .unwrap();

    let first = iter.next().unwrap().unwrap();
    assert_eq!(
        iter.pattern().and_then(Pattern::kind),
        Some(BuiltinPattern::DashedSeconds)
    );
    assert_eq!(first.timestamp, "27-02-14 06:29:21");

    let second = iter.next().unwrap().unwrap();
    assert!(second.is_notification);
    assert!(iter.next().is_none());
}

#[test]
fn test_unknown_format_is_fatal() {
    let dir = fixtures();
    let err = ChatLogParser::new()
        .parse_file(dir.path().join("unknown.txt"))
        .unwrap_err();
    assert!(err.is_pattern_not_found());
    assert!(err.to_string().contains("Hello"));
}

#[test]
fn test_empty_file() {
    let dir = fixtures();
    let records = ChatLogParser::new()
        .multiline(true)
        .parse_file(dir.path().join("empty.txt"))
        .unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_invalid_utf8_does_not_abort_file() {
    let dir = fixtures();
    let path = dir.path().join("latin1.txt");
    fs::write(
        &path,
        b"27/02/14, 06:29 - Steve: bad \xff byte\n28/02/14, 07:00 - Tony: OK\n",
    )
    .unwrap();

    let records = ChatLogParser::new().parse_file(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].content, "bad \u{FFFD} byte");
    assert_eq!(records[1].content, "OK");
}

#[test]
fn test_missing_file() {
    let err = ChatLogParser::new()
        .parse_file("/definitely/not/here.txt")
        .unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_timezone_conversion() {
    let pattern = Pattern::new(r"^(\d\d/\d\d/\d\d \d\d:\d\d:\d\d): ([\s\S]+)").unwrap();
    let line = "31/01/17 20:51:00: Steve: hi";
    let config = ParserConfig::new()
        .with_date_format(DateFormatConfig::new("DD/MM/YY HH:mm:ss"))
        .with_timestamp(true);

    let utc = ChatLogParser::with_config(config.clone())
        .pattern(pattern.clone())
        .parse_str(line)
        .unwrap();
    let jerusalem = ChatLogParser::with_config(config.with_timezone("Asia/Jerusalem"))
        .pattern(pattern)
        .parse_str(line)
        .unwrap();

    assert_eq!(
        utc[0].timestamp_epoch.unwrap() - jerusalem[0].timestamp_epoch.unwrap(),
        7_200_000
    );
    // without an output format the display string stays raw
    assert_eq!(jerusalem[0].timestamp, "31/01/17 20:51:00");
}

#[test]
fn test_transforms_run_in_order() {
    let records = ChatLogParser::new()
        .map(|mut r| {
            r.content = r.content.trim_end_matches('.').to_string();
            r
        })
        .map(|mut r| {
            r.content.push('!');
            r
        })
        .parse_str("27/02/14, 06:29 - Steve: We won.")
        .unwrap();
    assert_eq!(records[0].content, "We won!");
}

#[test]
fn test_bad_dates_are_flagged_not_fatal() {
    let records = ChatLogParser::new()
        .format("MM/DD/YY, HH:mm", "YYYY-MM-DD")
        .parse_str("27/02/14, 06:29 - Steve: We won.\n01/02/14, 06:30 - Tony: OK")
        .unwrap();

    assert!(records[0].invalid_date);
    assert_eq!(records[0].timestamp, "27/02/14, 06:29");
    assert!(!records[1].invalid_date);
    assert_eq!(records[1].timestamp, "2014-01-02");
}

#[test]
fn test_parse_reader() {
    let input = Cursor::new("27/02/14, 06:29 - Steve: We won.\nTruly.\n");
    let records = ChatLogParser::new().multiline(true).parse_reader(input).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "We won.\nTruly.");
}

#[test]
fn test_parse_then_serialize() {
    let dir = fixtures();
    let records = ChatLogParser::new()
        .multiline(true)
        .parse_file(dir.path().join("android.txt"))
        .unwrap();

    let out = dir.path().join("out.csv");
    let text = write_delimited_text(&records, &out, &default_fields()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "date,hour,author,content");
    assert_eq!(lines[1], "27/02/14,06:29,\"Steve\",\"We won.");
    assert_eq!(lines[2], "Truly.\"");
    assert_eq!(lines[3], "27/02/14,06:30,\"\",\"Tony Stark was added\"");
    assert_eq!(fs::read_to_string(&out).unwrap(), text);
}

#[test]
fn test_default_legacy_output_is_rectangular() {
    let dir = fixtures();
    for name in ["android.txt", "meridiem.txt", "dashed.txt"] {
        let records = ChatLogParser::new()
            .parse_file(dir.path().join(name))
            .unwrap();
        let text = to_delimited_text(&records, &default_fields());

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let width = reader.headers().unwrap().len();
        let mut rows = 0;
        for row in reader.records() {
            assert_eq!(row.unwrap().len(), width, "{name}");
            rows += 1;
        }
        assert_eq!(rows, records.len(), "{name}");
    }
}

#[test]
fn test_quoted_csv_round_trips_through_csv_reader() {
    let records = ChatLogParser::new()
        .multiline(true)
        .parse_str("27/02/14, 06:29 - Steve: say \"hi\", then\nleave")
        .unwrap();

    let mut fields = default_fields();
    fields.push(Box::new(BuiltinField::Notification));
    let text = to_quoted_csv(&records, &fields).unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        ["date", "hour", "author", "content", "notification"]
    );
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[0], "27/02/14");
    assert_eq!(&row[1], "06:29");
    assert_eq!(&row[2], "Steve");
    assert_eq!(&row[3], "say \"hi\", then\nleave");
    assert_eq!(&row[4], "false");
}

#[test]
fn test_custom_field() {
    let records = ChatLogParser::new()
        .parse_str("27/02/14, 06:29 - Steve: We won.")
        .unwrap();
    let fields = vec![
        field("author", |r: &Record| r.author.clone()),
        field("length", |r: &Record| r.content.len().to_string()),
    ];
    assert_eq!(fields[1].name(), "length");
    assert_eq!(to_delimited_text(&records, &fields), "author,length\nSteve,7");
}

#[test]
fn test_record_serializes_with_serde() {
    let records = ChatLogParser::new()
        .timestamp(true)
        .parse_str("27/02/14, 06:29 - Steve: We won.")
        .unwrap();
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["author"], "Steve");
    assert_eq!(json["timestamp_epoch"], 1393482540000i64);

    let back: Record = serde_json::from_value(json).unwrap();
    assert_eq!(back, records[0]);
}
