//! Record serialization.
//!
//! - [`to_delimited_text`] / [`write_delimited_text`] - legacy comma-delimited
//!   text, no escaping beyond what each field applies
//! - [`to_quoted_csv`] / [`write_quoted_csv`] - RFC 4180 CSV via the `csv`
//!   crate - requires `csv-output` feature
//!
//! Columns are described by [`Field`] implementations. [`default_fields`]
//! gives `date`, `hour`, `author`, `content`; [`BuiltinField`] lists the rest and
//! [`field`] wraps a closure.
//!
//! # Example
//!
//! ```rust
//! use wa2csv::output::{BuiltinField, Field, default_fields, to_delimited_text};
//! use wa2csv::Record;
//!
//! let records = vec![Record::new("27/02/14, 06:29", "Steve", "We won.")];
//!
//! let text = to_delimited_text(&records, &default_fields());
//! assert_eq!(text, "date,hour,author,content\n27/02/14,06:29,\"Steve\",\"We won.\"");
//!
//! let mut fields = default_fields();
//! fields.push(Box::new(BuiltinField::Notification));
//! assert!(to_delimited_text(&records, &fields).ends_with(",false"));
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod delimited;
mod fields;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_quoted_csv, write_quoted_csv};
pub use delimited::{to_delimited_text, write_delimited_text};
pub use fields::{BuiltinField, Field, FieldFn, default_fields, field};
