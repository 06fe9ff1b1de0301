//! User-supplied record transforms.
//!
//! Transforms run in registration order on every record as it is produced.
//! Each one receives the record returned by the previous one. The first
//! failure aborts the whole parse; no later records are delivered.
//!
//! # Example
//!
//! ```
//! use wa2csv::transform::TransformPipeline;
//! use wa2csv::Record;
//!
//! let mut pipeline = TransformPipeline::new();
//! pipeline.map(|mut r: Record| {
//!     r.author = r.author.to_uppercase();
//!     r
//! });
//!
//! let record = pipeline.apply(Record::new("27/02/14, 06:29", "Steve", "hi"))?;
//! assert_eq!(record.author, "STEVE");
//! # Ok::<(), wa2csv::Wa2csvError>(())
//! ```

use std::fmt;

use crate::error::{BoxError, Result, Wa2csvError};
use crate::record::Record;

/// A record-to-record transformation.
pub trait Transform: Send + Sync {
    fn apply(&self, record: Record) -> std::result::Result<Record, BoxError>;
}

impl<F> Transform for F
where
    F: Fn(Record) -> std::result::Result<Record, BoxError> + Send + Sync,
{
    fn apply(&self, record: Record) -> std::result::Result<Record, BoxError> {
        self(record)
    }
}

/// Ordered list of transforms.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fallible transform.
    pub fn push(&mut self, transform: impl Transform + 'static) {
        self.transforms.push(Box::new(transform));
    }

    /// Appends an infallible transform.
    pub fn map<F>(&mut self, f: F)
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.push(move |record: Record| -> std::result::Result<Record, BoxError> {
            Ok(f(record))
        });
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Threads `record` through every transform.
    pub fn apply(&self, record: Record) -> Result<Record> {
        self.transforms
            .iter()
            .enumerate()
            .try_fold(record, |record, (index, transform)| {
                transform
                    .apply(record)
                    .map_err(|source| Wa2csvError::Transform { index, source })
            })
    }
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("len", &self.transforms.len())
            .finish()
    }
}
