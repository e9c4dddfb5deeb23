use std::collections::BTreeSet;

use crate::data::{OccurrenceTable, COUNTRY, LATITUDE, LONGITUDE, YEAR};
use crate::errors::SummaryError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Min and max of the finite values, or `None` when there are none.
    pub fn of(values: &[f64]) -> Option<Self> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Extent { min: v, max: v }),
                Some(Extent { min, max }) => Some(Extent {
                    min: min.min(v),
                    max: max.max(v),
                }),
            })
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// What the information panel shows for one successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub countries: BTreeSet<String>,
    pub latitude: Extent,
    pub longitude: Extent,
    pub record_count: usize,
    pub years: Option<Extent>,
}

pub fn summarize(table: &OccurrenceTable) -> Result<Summary, SummaryError> {
    let latitude = Extent::of(&table.numbers(LATITUDE)).ok_or(SummaryError::NoData { field: "latitude" })?;
    let longitude =
        Extent::of(&table.numbers(LONGITUDE)).ok_or(SummaryError::NoData { field: "longitude" })?;

    let countries = table
        .strings(COUNTRY)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Summary {
        countries,
        latitude,
        longitude,
        record_count: table.record_count,
        years: Extent::of(&table.numbers(YEAR)),
    })
}

impl Summary {
    pub fn countries_text(&self) -> String {
        if self.countries.is_empty() {
            "No country recorded".to_string()
        } else {
            self.countries.iter().cloned().collect::<Vec<_>>().join("\n")
        }
    }

    pub fn latitude_text(&self) -> String {
        format!(
            "Maximum latitude: {:.2}\nMinimum latitude: {:.2}",
            round2(self.latitude.max),
            round2(self.latitude.min)
        )
    }

    pub fn longitude_text(&self) -> String {
        format!(
            "Maximum longitude: {:.2}\nMinimum longitude: {:.2}",
            round2(self.longitude.max),
            round2(self.longitude.min)
        )
    }

    pub fn records_text(&self) -> String {
        format!("Records: {}", self.record_count)
    }

    /// Panel lines in display order: longitude, latitude, then where the
    /// species was seen, then record details.
    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.longitude_text(),
            self.latitude_text(),
            "Has been seen in".to_string(),
            self.countries_text(),
            self.records_text(),
        ];
        lines.extend(self.years_text());
        lines
    }

    /// `None` when no record carried a year.
    pub fn years_text(&self) -> Option<String> {
        self.years
            .map(|years| format!("Years: {} – {}", years.min as i64, years.max as i64))
    }
}
