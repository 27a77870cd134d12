//! Pipeline run configuration

use std::path::PathBuf;

use super::{FittrackError, Result};
use crate::sources::CellRange;

/// Which aggregation a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Category {
    /// Walked/ran/cycled distance sums
    Activities,
    /// Monthly averages of weight, body fat and body age
    Body,
}

/// What to do with a month label whose abbreviation is not in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UnknownMonthPolicy {
    /// Leave the row out
    #[default]
    Drop,
    /// Bucket it into January (legacy behaviour)
    January,
}

/// Input source identifier
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// Delimited text export (tab, semicolon or comma)
    Delimited(PathBuf),
    /// Workbook export with ordered sheet/range pairs
    Workbook {
        path: PathBuf,
        sheets: Vec<String>,
        ranges: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub category: Category,
    pub source: SourceSpec,
    /// Activity row adapter name; `None` picks the default for the source kind
    pub layout: Option<String>,
    pub unknown_month: UnknownMonthPolicy,
}

impl PipelineConfig {
    pub fn new(category: Category, source: SourceSpec) -> Self {
        Self {
            category,
            source,
            layout: None,
            unknown_month: UnknownMonthPolicy::default(),
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_unknown_month(mut self, policy: UnknownMonthPolicy) -> Self {
        self.unknown_month = policy;
        self
    }

    /// Resolve the sheet/range pairs, failing before any file is touched
    pub fn sheet_ranges(&self) -> Result<Vec<(String, CellRange)>> {
        match &self.source {
            SourceSpec::Delimited(_) => Ok(Vec::new()),
            SourceSpec::Workbook { sheets, ranges, .. } => {
                if sheets.len() != ranges.len() {
                    return Err(FittrackError::RangeMismatch {
                        sheets: sheets.len(),
                        ranges: ranges.len(),
                    });
                }
                if sheets.is_empty() {
                    return Err(FittrackError::Config(
                        "at least one sheet/range pair is required".into(),
                    ));
                }
                sheets
                    .iter()
                    .zip(ranges)
                    .map(|(sheet, range)| Ok((sheet.clone(), range.parse::<CellRange>()?)))
                    .collect()
            }
        }
    }
}
