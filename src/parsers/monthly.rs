//! Spreadsheet rows keyed by a month label ("Mär 2023")

use crate::services::normalizer::parse_month_label;
use crate::types::{ActivityDate, Metric, RowError, UnknownMonthPolicy};

use super::{AdapterRegistry, RowSourceAdapter};

/// Labels starting with these (case-insensitive) are subtotal lines
const SUBTOTAL_PREFIXES: &[&str] = &["total", "sum"];

/// `label, <col>, <col>, <col>` rows where each column maps to a metric or is ignored
pub struct MonthLabelRows {
    columns: [Option<Metric>; 3],
    unknown_month: UnknownMonthPolicy,
}

impl MonthLabelRows {
    /// Default columns: walked, ran, then one ignored column
    pub fn new(unknown_month: UnknownMonthPolicy) -> Self {
        Self {
            columns: [Some(Metric::Walked), Some(Metric::Ran), None],
            unknown_month,
        }
    }

    pub fn with_columns(mut self, columns: [Option<Metric>; 3]) -> Self {
        self.columns = columns;
        self
    }

    fn label<'a>(&self, row: &'a [String]) -> &'a str {
        row.first().map(|s| s.trim()).unwrap_or_default()
    }
}

impl RowSourceAdapter for MonthLabelRows {
    fn name(&self) -> &str {
        AdapterRegistry::SHEET_MONTHLY
    }

    fn min_fields(&self) -> usize {
        1 + self.columns.len()
    }

    fn screen(&self, row: &[String]) -> Result<(), RowError> {
        let label = self.label(row).to_lowercase();
        if SUBTOTAL_PREFIXES.iter().any(|p| label.starts_with(p)) {
            return Err(RowError::Excluded(self.label(row).to_string()));
        }
        Ok(())
    }

    fn locate_date(&self, row: &[String]) -> Result<ActivityDate, RowError> {
        let key = parse_month_label(self.label(row), self.unknown_month)?;
        Ok(ActivityDate::Month(key))
    }

    fn metric_cell<'a>(&self, row: &'a [String], metric: Metric) -> Option<&'a str> {
        let pos = self.columns.iter().position(|c| *c == Some(metric))?;
        row.get(pos + 1).map(String::as_str)
    }
}
