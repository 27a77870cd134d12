//! Rows with an explicit per-day date followed by walked, ran, cycled

use crate::services::normalizer::{parse_date, DateFormat};
use crate::types::{ActivityDate, Metric, RowError};

use super::{AdapterRegistry, RowSourceAdapter};

/// `date, walked, ran, cycled` rows
pub struct DatedRows {
    name: &'static str,
}

impl DatedRows {
    /// Fixed four-field delimited export
    pub fn delimited() -> Self {
        Self {
            name: AdapterRegistry::DELIMITED_DAILY,
        }
    }

    /// Spreadsheet range whose first column is a date
    pub fn sheet() -> Self {
        Self {
            name: AdapterRegistry::SHEET_DAILY,
        }
    }
}

impl RowSourceAdapter for DatedRows {
    fn name(&self) -> &str {
        self.name
    }

    fn min_fields(&self) -> usize {
        4
    }

    fn locate_date(&self, row: &[String]) -> Result<ActivityDate, RowError> {
        let raw = row.first().map(String::as_str).unwrap_or_default();
        Ok(ActivityDate::Day(parse_date(raw, DateFormat::DAY)?.date()))
    }

    fn metric_cell<'a>(&self, row: &'a [String], metric: Metric) -> Option<&'a str> {
        let col = match metric {
            Metric::Walked => 1,
            Metric::Ran => 2,
            Metric::Cycled => 3,
        };
        row.get(col).map(String::as_str)
    }
}
