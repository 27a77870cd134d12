//! Raw cell normalization
//!
//! Turns spreadsheet/CSV text into typed values: numbers with locale decimal
//! commas and unit suffixes, dates in several layouts, and localized month
//! labels.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::types::{MonthKey, RowError, UnknownMonthPolicy};

/// Placeholder some exports write instead of leaving a cell empty
pub const MISSING_TOKEN: &str = "--";

/// Unit suffixes recognised on numeric cells
pub const UNIT_KG: &str = "kg";
pub const UNIT_PERCENT: &str = "%";

/// Month abbreviations (English and de-DE short forms), lowercase, no dot
const MONTH_TABLE: &[(&str, u32)] = &[
    ("jan", 1),
    ("jän", 1),
    ("feb", 2),
    ("mar", 3),
    ("mär", 3),
    ("märz", 3),
    ("mrz", 3),
    ("apr", 4),
    ("may", 5),
    ("mai", 5),
    ("jun", 6),
    ("juni", 6),
    ("jul", 7),
    ("juli", 7),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("oct", 10),
    ("okt", 10),
    ("nov", 11),
    ("dec", 12),
    ("dez", 12),
];

// "07:32 Mar.05 2024", "7:32 Okt. 5 2024"
static CLOCK_MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s+(\p{L}+)\.?\s*(\d{1,2}),?\s+(\d{4})$")
        .expect("timestamp pattern is valid")
});

/// Date layouts tried by [`parse_date`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// 2024-03-05
    IsoDate,
    /// 05.03.2024
    DottedDate,
    /// 2024-03-05 07:32 or 2024-03-05 07:32:10
    IsoDateTime,
    /// 07:32 Mar.05 2024
    ClockMonthDayYear,
}

impl DateFormat {
    /// Candidates for sources with one row per day
    pub const DAY: &'static [DateFormat] = &[DateFormat::IsoDate, DateFormat::DottedDate];

    /// Candidates for timestamped body readings
    pub const TIMESTAMP: &'static [DateFormat] = &[
        DateFormat::ClockMonthDayYear,
        DateFormat::IsoDateTime,
        DateFormat::IsoDate,
        DateFormat::DottedDate,
    ];

    fn parse(self, raw: &str) -> Option<NaiveDateTime> {
        match self {
            DateFormat::IsoDate => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
            DateFormat::DottedDate => NaiveDate::parse_from_str(raw, "%d.%m.%Y")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
            DateFormat::IsoDateTime => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
                .ok(),
            DateFormat::ClockMonthDayYear => parse_clock_month_day_year(raw),
        }
    }
}

fn parse_clock_month_day_year(raw: &str) -> Option<NaiveDateTime> {
    let caps = CLOCK_MONTH_DAY_YEAR.captures(raw)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let month = month_number(&caps[3])?;
    let day: u32 = caps[4].parse().ok()?;
    let year: i32 = caps[5].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

/// Look up a month abbreviation; case-insensitive, trailing dot ignored
pub fn month_number(abbrev: &str) -> Option<u32> {
    let key = abbrev.trim().trim_end_matches('.').to_lowercase();
    MONTH_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, month)| *month)
}

/// Canonical column-title key: "Body Fat " → "body_fat"
pub fn header_key(cell: &str) -> String {
    cell.trim().replace(' ', "_").to_lowercase()
}

/// Parse a numeric cell.
///
/// Strips `unit` if the value ends with it, converts a decimal comma to a
/// dot, and reports empty cells or the `--` placeholder as `Ok(None)`.
pub fn parse_numeric(raw: &str, unit: Option<&str>) -> Result<Option<f64>, RowError> {
    let mut value = raw.trim();
    if let Some(unit) = unit {
        if let Some(stripped) = value.strip_suffix(unit) {
            value = stripped.trim_end();
        }
    }

    if value.is_empty() || value == MISSING_TOKEN {
        return Ok(None);
    }

    let normalized = value.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(RowError::InvalidNumber(raw.to_string())),
    }
}

/// Parse a numeric cell that must hold a whole number (e.g. body age)
pub fn parse_whole(raw: &str) -> Result<Option<u32>, RowError> {
    match parse_numeric(raw, None)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => Ok(Some(n as u32)),
        Some(_) => Err(RowError::InvalidNumber(raw.to_string())),
    }
}

/// Try each candidate layout in order; the first that matches wins
pub fn parse_date(raw: &str, candidates: &[DateFormat]) -> Result<NaiveDateTime, RowError> {
    let value = raw.trim();
    candidates
        .iter()
        .find_map(|format| format.parse(value))
        .ok_or_else(|| RowError::InvalidDate(raw.to_string()))
}

/// Canonicalize a "<month-abbrev> <year>" label such as "Mär 2023".
///
/// With [`UnknownMonthPolicy::January`] an abbreviation missing from the
/// table maps to month 01 instead of failing.
pub fn parse_month_label(raw: &str, policy: UnknownMonthPolicy) -> Result<MonthKey, RowError> {
    let mut tokens = raw.split_whitespace();
    let (abbrev, year) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(abbrev), Some(year), None) => (abbrev, year),
        _ => return Err(RowError::InvalidDate(raw.to_string())),
    };

    if year.len() != 4 {
        return Err(RowError::InvalidDate(raw.to_string()));
    }
    let year: i32 = year
        .parse()
        .map_err(|_| RowError::InvalidDate(raw.to_string()))?;

    let month = match (month_number(abbrev), policy) {
        (Some(month), _) => month,
        (None, UnknownMonthPolicy::January) => 1,
        (None, UnknownMonthPolicy::Drop) => return Err(RowError::UnknownMonth(abbrev.to_string())),
    };

    Ok(MonthKey::new(year, month))
}
