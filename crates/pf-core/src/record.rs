//! Run records and the assembled dataset.

use crate::schema::{Field, Schema};
use crate::{CoreError, CoreResult};

/// One simulator run, as extracted from its output file.
///
/// `None` marks a value that could not be recovered from the source text.
/// Records are fixed-width: `values.len()` always equals the schema width
/// the record was built for.
#[derive(Clone, Debug, PartialEq)]
pub struct RunRecord {
    pub source: String,
    values: Vec<Option<f64>>,
}

impl RunRecord {
    /// Build a record, padding with `None` or truncating to the schema width.
    pub fn from_values(source: impl Into<String>, schema: Schema, mut values: Vec<Option<f64>>) -> Self {
        values.resize(schema.width(), None);
        Self {
            source: source.into(),
            values,
        }
    }

    /// A record with every value missing (unreadable source).
    pub fn missing(source: impl Into<String>, schema: Schema) -> Self {
        Self::from_values(source, schema, Vec::new())
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(field.index()).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Ordered collection of run records sharing one schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    schema: Schema,
    records: Vec<RunRecord>,
}

impl Dataset {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn push(&mut self, record: RunRecord) -> CoreResult<()> {
        let actual = record.width();
        if actual != self.schema.width() {
            return Err(CoreError::WidthMismatch {
                source_name: record.source,
                expected: self.schema.width(),
                actual,
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Remove rows where `field` is missing. Returns the dropped sources in order.
    pub fn drop_missing(&mut self, field: Field) -> Vec<String> {
        let mut dropped = Vec::new();
        self.records.retain(|r| {
            if r.get(field).is_some() {
                true
            } else {
                dropped.push(r.source.clone());
                false
            }
        });
        dropped
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
