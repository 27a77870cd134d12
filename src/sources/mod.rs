//! Raw cell sources
//!
//! Everything here yields text grids; nothing is interpreted until a row
//! adapter and the normalizer see it.

mod delimited;
mod range;
mod spreadsheet;
mod workbook;

pub use delimited::{detect_delimiter, DelimitedSource};
pub use range::CellRange;
pub use spreadsheet::Spreadsheet;
pub use workbook::Workbook;

use std::path::Path;

use crate::types::Result;

/// Rows of raw text cells
pub type Grid = Vec<Vec<String>>;

/// Capability to read a rectangular block of cells from a named sheet
pub trait CellRangeReader {
    /// Names of the sheets this source holds
    fn sheet_names(&self) -> Vec<&str>;

    /// Read `range` from `sheet`.
    ///
    /// Cells past the end of a short row come back as empty strings; rows
    /// past the end of the sheet are not returned.
    fn read_range(&self, sheet: &str, range: &CellRange) -> Result<Grid>;
}

/// Open a workbook: `.json` exports go through [`Workbook`], anything else
/// is handed to the native spreadsheet reader
pub fn open_reader(path: &Path) -> Result<Box<dyn CellRangeReader>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(Box::new(Workbook::open(path)?))
    } else {
        Ok(Box::new(Spreadsheet::open(path)?))
    }
}
