//! RFC 4180 CSV writer.
//!
//! Unlike the legacy delimited writer, cells are quoted by the `csv` crate
//! whenever they contain a delimiter, quote or newline. Fields contribute
//! their [`Field::raw`] value, so the built-in `author` and `content` columns
//! are not double-wrapped.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::Record;

use super::Field;

/// Serializes records to quoted CSV.
///
/// Every row, including the last, ends with `\n`.
pub fn to_quoted_csv(records: &[Record], fields: &[Box<dyn Field>]) -> Result<String> {
    let mut writer = csv_builder().from_writer(Vec::new());
    write_rows(&mut writer, records, fields)?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Writes quoted CSV to `output_path`.
pub fn write_quoted_csv(
    records: &[Record],
    output_path: impl AsRef<Path>,
    fields: &[Box<dyn Field>],
) -> Result<()> {
    let file = File::create(output_path.as_ref())?;
    let mut writer = csv_builder().from_writer(file);
    write_rows(&mut writer, records, fields)?;
    writer.flush()?;
    info!(
        path = %output_path.as_ref().display(),
        records = records.len(),
        "wrote quoted csv"
    );
    Ok(())
}

fn csv_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn write_rows<W: io::Write>(
    writer: &mut csv::Writer<W>,
    records: &[Record],
    fields: &[Box<dyn Field>],
) -> Result<()> {
    writer.write_record(fields.iter().map(|f| f.name()))?;
    for record in records {
        writer.write_record(fields.iter().map(|f| f.raw(record)))?;
    }
    Ok(())
}
