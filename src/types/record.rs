//! Normalized records and aggregate shapes

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Activity distance metrics, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Walked,
    Ran,
    Cycled,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Walked, Metric::Ran, Metric::Cycled];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Walked => "walked",
            Metric::Ran => "ran",
            Metric::Cycled => "cycled",
        }
    }
}

/// Calendar month bucket, rendered as "YYYY-MM"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where an activity row sits in time.
///
/// Month-label sources carry no day, so they never reach a Year bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityDate {
    Day(NaiveDate),
    Month(MonthKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub date: ActivityDate,
    pub walked: f64,
    pub ran: f64,
    pub cycled: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRecord {
    pub timestamp: NaiveDateTime,
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub body_age: Option<u32>,
}

/// Running distance sums; all three metrics are always present
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActivityTotals {
    pub walked: f64,
    pub ran: f64,
    pub cycled: f64,
}

impl ActivityTotals {
    pub fn add(&mut self, record: &ActivityRecord) {
        self.walked += record.walked;
        self.ran += record.ran;
        self.cycled += record.cycled;
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Walked => self.walked,
            Metric::Ran => self.ran,
            Metric::Cycled => self.cycled,
        }
    }
}

/// `{totals, yearly, monthly}` activity result
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActivityReport {
    pub totals: ActivityTotals,
    pub yearly: BTreeMap<i32, ActivityTotals>,
    pub monthly: BTreeMap<MonthKey, ActivityTotals>,
}

/// One month of averaged body metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyMonth {
    pub month: MonthKey,
    pub weight: f64,
    pub body_fat: Option<f64>,
    pub body_age: Option<f64>,
}

/// Row accounting for a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
}

impl IngestStats {
    pub fn record_used(&mut self) {
        self.rows_read += 1;
        self.rows_used += 1;
    }

    pub fn record_skipped(&mut self) {
        self.rows_read += 1;
        self.rows_skipped += 1;
    }
}
