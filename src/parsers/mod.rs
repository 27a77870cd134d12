//! Row source adapters
//!
//! Each adapter knows where a source layout keeps its date (or month label)
//! and its metric cells. The pipeline drives every layout through the same
//! [`RowSourceAdapter::extract`] and a single aggregator.

mod body;
mod dated;
mod monthly;

pub use body::BodySchema;
pub use dated::DatedRows;
pub use monthly::MonthLabelRows;

use crate::services::normalizer::{header_key, parse_numeric};
use crate::types::{ActivityDate, ActivityRecord, Metric, RowError, UnknownMonthPolicy};

/// Layout-specific access to one activity row
pub trait RowSourceAdapter: Send + Sync {
    /// Adapter name (e.g., "sheet-daily")
    fn name(&self) -> &str;

    /// Rows with fewer fields are rejected before anything is parsed
    fn min_fields(&self) -> usize;

    /// Parse the date or month-label cell
    fn locate_date(&self, row: &[String]) -> Result<ActivityDate, RowError>;

    /// Raw cell holding `metric`, or `None` if the layout has no such column
    fn metric_cell<'a>(&self, row: &'a [String], metric: Metric) -> Option<&'a str>;

    /// Reject rows the layout never aggregates (e.g. subtotal lines)
    fn screen(&self, _row: &[String]) -> Result<(), RowError> {
        Ok(())
    }

    /// Whether `row` is a column-title line rather than data.
    ///
    /// Any cell naming a metric ("Walked", " ran ") marks a header.
    fn is_header(&self, row: &[String]) -> bool {
        row.iter()
            .map(|cell| header_key(cell))
            .any(|key| Metric::ALL.iter().any(|m| m.name() == key))
    }

    /// Normalize one row into a record.
    ///
    /// Missing metric cells count as 0; an unreadable date or a non-numeric
    /// or negative metric rejects the whole row.
    fn extract(&self, row: &[String]) -> Result<ActivityRecord, RowError> {
        if row.len() < self.min_fields() {
            return Err(RowError::TooFewFields {
                got: row.len(),
                expected: self.min_fields(),
            });
        }
        self.screen(row)?;

        let date = self.locate_date(row)?;
        let distance = |metric: Metric| -> Result<f64, RowError> {
            match self.metric_cell(row, metric) {
                Some(raw) => match parse_numeric(raw, None)? {
                    Some(n) if n < 0.0 => Err(RowError::NegativeValue(raw.to_string())),
                    value => Ok(value.unwrap_or(0.0)),
                },
                None => Ok(0.0),
            }
        };

        Ok(ActivityRecord {
            date,
            walked: distance(Metric::Walked)?,
            ran: distance(Metric::Ran)?,
            cycled: distance(Metric::Cycled)?,
        })
    }
}

/// Registry of available activity adapters
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn RowSourceAdapter>>,
}

impl AdapterRegistry {
    pub const DELIMITED_DAILY: &'static str = "delimited-daily";
    pub const SHEET_DAILY: &'static str = "sheet-daily";
    pub const SHEET_MONTHLY: &'static str = "sheet-monthly";

    /// Create a registry with the built-in layouts
    pub fn new(unknown_month: UnknownMonthPolicy) -> Self {
        Self {
            adapters: vec![
                Box::new(DatedRows::delimited()),
                Box::new(DatedRows::sheet()),
                Box::new(MonthLabelRows::new(unknown_month)),
            ],
        }
    }

    /// Add or replace an adapter (matched by name)
    pub fn register(&mut self, adapter: Box<dyn RowSourceAdapter>) {
        self.adapters.retain(|a| a.name() != adapter.name());
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Box<dyn RowSourceAdapter>] {
        &self.adapters
    }

    /// Find an adapter by name
    pub fn get(&self, name: &str) -> Option<&dyn RowSourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(UnknownMonthPolicy::default())
    }
}

#[cfg(test)]
pub(crate) fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}
