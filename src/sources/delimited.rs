//! Delimited text exports (TSV, semicolon or comma separated)

use std::fs;
use std::path::Path;

use super::Grid;
use crate::types::{FittrackError, Result};

/// Pick the field separator from the first line: tab, then semicolon, then comma
pub fn detect_delimiter(first_line: &str) -> u8 {
    if first_line.contains('\t') {
        b'\t'
    } else if first_line.contains(';') {
        b';'
    } else {
        b','
    }
}

/// A delimited file read fully into memory
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    content: String,
}

impl DelimitedSource {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_text(fs::read_to_string(path)?))
    }

    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn delimiter(&self) -> u8 {
        detect_delimiter(self.content.lines().next().unwrap_or_default())
    }

    /// Split every line into trimmed raw fields. Blank lines are dropped.
    pub fn grid(&self) -> Result<Grid> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter())
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(self.content.as_bytes());

        let mut grid = Grid::new();
        for record in reader.records() {
            let record = record.map_err(|e| FittrackError::Parse(e.to_string()))?;
            grid.push(record.iter().map(String::from).collect());
        }
        Ok(grid)
    }
}
