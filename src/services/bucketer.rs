//! Year/month bucket derivation

use chrono::{Datelike, NaiveDate};

use crate::types::{ActivityDate, MonthKey};

/// Bucket keys a record contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buckets {
    /// `None` for month-label sources, which have no day-level date
    pub year: Option<i32>,
    pub month: MonthKey,
}

pub fn month_of(date: NaiveDate) -> MonthKey {
    MonthKey::new(date.year(), date.month())
}

pub fn buckets_from_date(date: NaiveDate) -> Buckets {
    Buckets {
        year: Some(date.year()),
        month: month_of(date),
    }
}

pub fn bucket_from_label(label: MonthKey) -> Buckets {
    Buckets {
        year: None,
        month: label,
    }
}

pub fn buckets_for(date: ActivityDate) -> Buckets {
    match date {
        ActivityDate::Day(day) => buckets_from_date(day),
        ActivityDate::Month(label) => bucket_from_label(label),
    }
}
