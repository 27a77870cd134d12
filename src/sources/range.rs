//! A1-style cell ranges ("A1:D28", "AA2:AC40")

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::types::FittrackError;

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z]{1,3})([0-9]+)\s*:\s*([A-Za-z]{1,3})([0-9]+)\s*$")
        .expect("range pattern is valid")
});

/// Inclusive rectangle of zero-based cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: usize,
    pub end_row: usize,
}

impl CellRange {
    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start_row..=self.end_row
    }

    pub fn cols(&self) -> std::ops::RangeInclusive<usize> {
        self.start_col..=self.end_col
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

/// "A" → 0, "Z" → 25, "AA" → 26
fn column_index(letters: &str) -> usize {
    letters
        .bytes()
        .map(|b| (b.to_ascii_uppercase() - b'A') as usize + 1)
        .fold(0, |acc, digit| acc * 26 + digit)
        - 1
}

fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn row_index(digits: &str, raw: &str) -> Result<usize, FittrackError> {
    match digits.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(FittrackError::InvalidRange(raw.to_string())),
    }
}

impl FromStr for CellRange {
    type Err = FittrackError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let caps = RANGE_RE
            .captures(raw)
            .ok_or_else(|| FittrackError::InvalidRange(raw.to_string()))?;

        let range = CellRange {
            start_col: column_index(&caps[1]),
            start_row: row_index(&caps[2], raw)?,
            end_col: column_index(&caps[3]),
            end_row: row_index(&caps[4], raw)?,
        };

        if range.start_col > range.end_col || range.start_row > range.end_row {
            return Err(FittrackError::InvalidRange(raw.to_string()));
        }
        Ok(range)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letters(self.start_col),
            self.start_row + 1,
            column_letters(self.end_col),
            self.end_row + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_range() {
        let range: CellRange = "A1:D28".parse().unwrap();
        assert_eq!(range.start_col, 0);
        assert_eq!(range.start_row, 0);
        assert_eq!(range.end_col, 3);
        assert_eq!(range.end_row, 27);
        assert_eq!(range.width(), 4);
    }

    #[test]
    fn test_parse_lowercase_and_spaces() {
        let range: CellRange = " b2 : c5 ".parse().unwrap();
        assert_eq!(range.to_string(), "B2:C5");
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        let range: CellRange = "Z1:AB3".parse().unwrap();
        assert_eq!(range.start_col, 25);
        assert_eq!(range.end_col, 27);
        assert_eq!(range.to_string(), "Z1:AB3");
    }

    #[test]
    fn test_reject_row_zero() {
        assert!("A0:B2".parse::<CellRange>().is_err());
    }

    #[test]
    fn test_reject_inverted_range() {
        assert!("D5:A1".parse::<CellRange>().is_err());
    }

    #[test]
    fn test_reject_garbage() {
        assert!(matches!(
            "A1-D4".parse::<CellRange>(),
            Err(FittrackError::InvalidRange(_))
        ));
        assert!("".parse::<CellRange>().is_err());
    }

    #[test]
    fn test_column_letters_round_trip_edges() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_index("ZZ"), 701);
    }
}
