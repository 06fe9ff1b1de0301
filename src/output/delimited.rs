//! Legacy comma-delimited writer.
//!
//! Cells are joined with `,` and rows with `\n`, with no escaping beyond what
//! each [`Field`] applies itself. The built-in `author` and `content` fields
//! wrap their value in double quotes, but embedded quotes, commas and newlines
//! are written as-is. Use [`to_quoted_csv`](super::to_quoted_csv) for
//! RFC 4180 output.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::Record;

use super::Field;

/// Serializes records to delimited text.
///
/// The first row holds the field names. No trailing newline is written.
pub fn to_delimited_text(records: &[Record], fields: &[Box<dyn Field>]) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(
        fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        rows.push(
            fields
                .iter()
                .map(|f| f.extract(record))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    rows.join("\n")
}

/// Serializes records and writes them to `output_path` as UTF-8.
///
/// All text is built before the file is touched. Returns the written text.
pub fn write_delimited_text(
    records: &[Record],
    output_path: impl AsRef<Path>,
    fields: &[Box<dyn Field>],
) -> Result<String> {
    let text = to_delimited_text(records, fields);
    fs::write(output_path.as_ref(), &text)?;
    info!(
        path = %output_path.as_ref().display(),
        records = records.len(),
        "wrote delimited text"
    );
    Ok(text)
}
