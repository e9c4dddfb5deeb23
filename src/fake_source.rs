//! Deterministic in-memory occurrence source for tests.

use std::time::Duration;

use serde_json::{json, Value};

use crate::data::{OccurrenceRecord, OccurrenceTable};
use crate::errors::FetchError;
use crate::gbif::{FetchResult, OccurrenceSource};

pub const FAKE_TAXON_KEY: u64 = 2_417_839;

enum Outcome {
    Records(Vec<OccurrenceRecord>),
    Fail(FetchError),
    Panic,
}

pub struct FakeSource {
    outcome: Outcome,
    delay: Option<Duration>,
    gate: Option<flume::Receiver<()>>,
}

impl FakeSource {
    pub fn with_records(records: Vec<OccurrenceRecord>) -> Self {
        Self {
            outcome: Outcome::Records(records),
            delay: None,
            gate: None,
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            outcome: Outcome::Fail(error),
            delay: None,
            gate: None,
        }
    }

    pub fn panicking() -> Self {
        Self {
            outcome: Outcome::Panic,
            delay: None,
            gate: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds the fetch until a value arrives on `gate`.
    pub fn gated(mut self, gate: flume::Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn table(&self) -> OccurrenceTable {
        match &self.outcome {
            Outcome::Records(records) => OccurrenceTable::from_records(FAKE_TAXON_KEY, records),
            _ => OccurrenceTable::from_records(FAKE_TAXON_KEY, &[]),
        }
    }
}

impl OccurrenceSource for FakeSource {
    async fn fetch(&self, species: &str) -> FetchResult {
        if let Some(gate) = &self.gate {
            let _ = gate.recv_async().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Outcome::Records(records) if records.is_empty() => Err(FetchError::EmptyResult {
                name: species.to_string(),
            }),
            Outcome::Records(_) => Ok(self.table()),
            Outcome::Fail(error) => Err(error.clone()),
            Outcome::Panic => panic!("fake source asked to panic"),
        }
    }
}

pub fn record(value: Value) -> OccurrenceRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Three Peruvian anchoveta sightings off Peru and Chile.
pub fn engraulis_records() -> Vec<OccurrenceRecord> {
    vec![
        record(json!({
            "decimalLongitude": -77.12,
            "decimalLatitude": -12.05,
            "scientificName": "Engraulis ringens Jenyns, 1842",
            "year": 2015,
            "country": "PE",
            "basisOfRecord": "HUMAN_OBSERVATION",
        })),
        record(json!({
            "decimalLongitude": -71.63,
            "decimalLatitude": -33.04,
            "scientificName": "Engraulis ringens Jenyns, 1842",
            "year": 2019,
            "country": "CL",
            "basisOfRecord": "PRESERVED_SPECIMEN",
        })),
        record(json!({
            "decimalLongitude": -70.31,
            "decimalLatitude": -18.47,
            "scientificName": "Engraulis ringens Jenyns, 1842",
            "year": 2008,
            "country": "PE",
            "individualCount": 4,
        })),
    ]
}
