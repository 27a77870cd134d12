//! Native spreadsheet reader (.ods, .xlsx, .xlsm, .xlsb, .xls)

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDateTime, NaiveTime};
use std::cell::RefCell;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{CellRange, CellRangeReader, Grid};
use crate::types::{FittrackError, Result};

/// Dates as the normalizer expects them: day only at midnight, else with clock time
fn format_timestamp(ts: NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(format_timestamp)
            .unwrap_or_else(|_| s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(format_timestamp)
            .unwrap_or_else(|| dt.as_f64().to_string()),
        other => other.to_string(),
    }
}

/// Workbook opened straight from disk; sheets are decoded on demand
pub struct Spreadsheet {
    names: Vec<String>,
    sheets: RefCell<Sheets<BufReader<File>>>,
}

impl Spreadsheet {
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path).map_err(|e| {
            FittrackError::Parse(format!("cannot open workbook {}: {}", path.display(), e))
        })?;
        Ok(Self {
            names: sheets.sheet_names(),
            sheets: RefCell::new(sheets),
        })
    }
}

impl CellRangeReader for Spreadsheet {
    fn sheet_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn read_range(&self, sheet: &str, range: &CellRange) -> Result<Grid> {
        if !self.names.iter().any(|n| n == sheet) {
            return Err(FittrackError::SheetNotFound(sheet.to_string()));
        }

        let data = self
            .sheets
            .borrow_mut()
            .worksheet_range(sheet)
            .map_err(|e| FittrackError::Parse(e.to_string()))?;

        let last_row = match data.end() {
            Some((row, _)) => row as usize,
            None => return Ok(Grid::new()),
        };

        // positions are absolute, so leading blank rows/columns stay aligned
        let grid = range
            .rows()
            .take_while(|r| *r <= last_row)
            .map(|r| {
                range
                    .cols()
                    .map(|c| {
                        data.get_value((r as u32, c as u32))
                            .map(cell_text)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Ok(grid)
    }
}
