//! Aggregator service for computing activity sums and body-metric averages

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::services::bucketer::{buckets_for, month_of};
use crate::types::{ActivityRecord, ActivityReport, BodyMonth, BodyRecord, MonthKey};

/// Arithmetic mean over the values actually seen
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Per-field means over one group of readings
#[derive(Debug, Clone, Copy, Default)]
struct BodyMeans {
    weight: Mean,
    body_fat: Mean,
    body_age: Mean,
}

impl BodyMeans {
    fn add(&mut self, weight: Option<f64>, body_fat: Option<f64>, body_age: Option<f64>) {
        self.weight.add(weight);
        self.body_fat.add(body_fat);
        self.body_age.add(body_age);
    }
}

/// Aggregator for computing activity and body statistics
pub struct Aggregator;

impl Aggregator {
    /// Sum distances into the grand total, yearly and monthly buckets.
    ///
    /// Month-label records have no year and only reach the monthly bucket.
    pub fn activities(records: &[ActivityRecord]) -> ActivityReport {
        let mut report = ActivityReport::default();

        for record in records {
            let buckets = buckets_for(record.date);

            report.totals.add(record);
            if let Some(year) = buckets.year {
                report.yearly.entry(year).or_default().add(record);
            }
            report.monthly.entry(buckets.month).or_default().add(record);
        }

        report
    }

    /// Monthly body-metric averages (sorted by month ascending).
    ///
    /// Readings are first collapsed to one value per field per calendar day,
    /// then the day values are averaged per month, so a day with many
    /// readings weighs the same as a day with one.
    pub fn body(records: &[BodyRecord]) -> Vec<BodyMonth> {
        if records.is_empty() {
            return Vec::new();
        }

        // Stage 1: per day
        let mut days: BTreeMap<NaiveDate, BodyMeans> = BTreeMap::new();
        for record in records {
            days.entry(record.timestamp.date()).or_default().add(
                Some(record.weight_kg),
                record.body_fat_pct,
                record.body_age.map(f64::from),
            );
        }

        // Stage 2: per month, over day values
        let mut months: BTreeMap<MonthKey, BodyMeans> = BTreeMap::new();
        for (date, day) in &days {
            months.entry(month_of(*date)).or_default().add(
                day.weight.value(),
                day.body_fat.value(),
                day.body_age.value(),
            );
        }

        months
            .into_iter()
            .map(|(month, means)| BodyMonth {
                month,
                // every reading carries a weight, so every month has one
                weight: means.weight.value().unwrap_or_default(),
                body_fat: means.body_fat.value(),
                body_age: means.body_age.value(),
            })
            .collect()
    }
}
