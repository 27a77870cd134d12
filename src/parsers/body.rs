//! Body-metric row schema
//!
//! Exports with a header row are mapped by column name; anything else is
//! read positionally as `date, weight, body fat, body age`.

use crate::services::normalizer::{
    header_key, parse_date, parse_numeric, parse_whole, DateFormat, UNIT_KG, UNIT_PERCENT,
};
use crate::types::{BodyRecord, RowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySchema {
    /// Columns located through the header row
    Named {
        date: usize,
        weight: usize,
        body_fat: Option<usize>,
        body_age: Option<usize>,
    },
    /// No usable header: fixed positions, first row is data
    Positional,
}

impl BodySchema {
    /// Probe the first row for the expected header names
    pub fn probe(first_row: &[String]) -> Self {
        let keys: Vec<String> = first_row.iter().map(|c| header_key(c)).collect();
        let find = |name: &str| keys.iter().position(|k| k == name);

        match (find("date"), find("weight")) {
            (Some(date), Some(weight)) => BodySchema::Named {
                date,
                weight,
                body_fat: find("body_fat"),
                body_age: find("body_age"),
            },
            _ => BodySchema::Positional,
        }
    }

    /// Whether the first row is a header and must not be read as data
    pub fn has_header(&self) -> bool {
        matches!(self, BodySchema::Named { .. })
    }

    fn columns(&self) -> (usize, usize, Option<usize>, Option<usize>) {
        match *self {
            BodySchema::Named {
                date,
                weight,
                body_fat,
                body_age,
            } => (date, weight, body_fat, body_age),
            BodySchema::Positional => (0, 1, Some(2), Some(3)),
        }
    }

    pub fn extract(&self, row: &[String]) -> Result<BodyRecord, RowError> {
        let (date, weight, body_fat, body_age) = self.columns();
        let cell = |col: Option<usize>| col.and_then(|c| row.get(c)).map(String::as_str);

        let timestamp = parse_date(cell(Some(date)).unwrap_or_default(), DateFormat::TIMESTAMP)?;
        let weight_kg = parse_numeric(cell(Some(weight)).unwrap_or_default(), Some(UNIT_KG))?
            .ok_or(RowError::MissingField("weight"))?;
        let body_fat_pct = match cell(body_fat) {
            Some(raw) => parse_numeric(raw, Some(UNIT_PERCENT))?,
            None => None,
        };
        let body_age = match cell(body_age) {
            Some(raw) => parse_whole(raw)?,
            None => None,
        };

        Ok(BodyRecord {
            timestamp,
            weight_kg,
            body_fat_pct,
            body_age,
        })
    }
}
