//! Workbook export reader
//!
//! Reads a JSON object mapping sheet name to a grid of cells (the shape the
//! `extract` subcommand writes from a native spreadsheet). Cells may be strings, numbers, booleans or
//! null; everything is handed on as text.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{CellRange, CellRangeReader, Grid};
use crate::types::{FittrackError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Text(String),
    Number(f64),
    Flag(bool),
    Empty,
}

impl RawCell {
    fn into_text(self) -> String {
        match self {
            RawCell::Text(s) => s,
            RawCell::Number(n) => n.to_string(),
            RawCell::Flag(b) => b.to_string(),
            RawCell::Empty => String::new(),
        }
    }
}

/// In-memory workbook: sheet name → full sheet grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: BTreeMap<String, Grid>,
}

impl Workbook {
    /// Load a workbook export from disk
    pub fn open(path: &Path) -> Result<Self> {
        let mut content = fs::read_to_string(path)?;
        Self::from_json(&mut content)
    }

    /// Decode a workbook export; `content` is used as scratch space
    pub fn from_json(content: &mut str) -> Result<Self> {
        // SAFETY: `content` is exclusively borrowed for the duration of the call; simd_json mutates it in place
        let raw: BTreeMap<String, Vec<Vec<RawCell>>> = unsafe {
            simd_json::from_str(content).map_err(|e| FittrackError::Parse(e.to_string()))?
        };

        let sheets = raw
            .into_iter()
            .map(|(name, rows)| {
                let grid = rows
                    .into_iter()
                    .map(|row| row.into_iter().map(RawCell::into_text).collect())
                    .collect();
                (name, grid)
            })
            .collect();

        Ok(Self { sheets })
    }
}

impl CellRangeReader for Workbook {
    fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    fn read_range(&self, sheet: &str, range: &CellRange) -> Result<Grid> {
        let rows = self
            .sheets
            .get(sheet)
            .ok_or_else(|| FittrackError::SheetNotFound(sheet.to_string()))?;

        let grid = range
            .rows()
            .map_while(|r| rows.get(r))
            .map(|row| {
                range
                    .cols()
                    .map(|col| row.get(col).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(grid)
    }
}
