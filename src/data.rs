use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const APP_ID: &str = "com.toasterrepair.SpeciesMapper";
pub const GBIF_API_URL: &str = "https://api.gbif.org/v1";
pub const GBIF_SPECIES_PAGE_URL: &str = "https://www.gbif.org/species";

pub const LONGITUDE: &str = "decimalLongitude";
pub const LATITUDE: &str = "decimalLatitude";
pub const SCIENTIFIC_NAME: &str = "scientificName";
pub const YEAR: &str = "year";
pub const COUNTRY: &str = "country";

/// Occurrence fields copied out of every GBIF record, in column order.
pub const TRACKED_FIELDS: [&str; 12] = [
    LONGITUDE,
    LATITUDE,
    SCIENTIFIC_NAME,
    YEAR,
    "month",
    "day",
    "occurrenceRemarks",
    COUNTRY,
    "basisOfRecord",
    "rightsHolder",
    "individualCount",
    "occurrenceID",
];

/// A raw occurrence record as returned by the occurrence search.
pub type OccurrenceRecord = Map<String, Value>;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NameMatch {
    #[serde(default)]
    pub usage_key: Option<u64>,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub scientific_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OccurrencePage {
    #[serde(default)]
    pub end_of_records: bool,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<OccurrenceRecord>,
}

/// Column-oriented view of a batch of occurrence records.
///
/// Each tracked field maps to the values of the records that carried it, in
/// record order. Records missing a field are skipped for that column rather
/// than padded, so two columns are only index-aligned when no record lacked
/// either field.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceTable {
    pub taxon_key: u64,
    pub record_count: usize,
    columns: BTreeMap<&'static str, Vec<Value>>,
}

impl OccurrenceTable {
    pub fn from_records(taxon_key: u64, records: &[OccurrenceRecord]) -> Self {
        let mut columns: BTreeMap<&'static str, Vec<Value>> = TRACKED_FIELDS
            .iter()
            .map(|field| (*field, Vec::new()))
            .collect();

        for record in records {
            for field in TRACKED_FIELDS {
                match record.get(field) {
                    Some(Value::Null) | None => {}
                    Some(value) => {
                        if let Some(column) = columns.get_mut(field) {
                            column.push(value.clone());
                        }
                    }
                }
            }
        }

        Self {
            taxon_key,
            record_count: records.len(),
            columns,
        }
    }

    pub fn column(&self, field: &str) -> &[Value] {
        self.columns.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    /// Numeric values of a column; non-numeric entries are dropped.
    pub fn numbers(&self, field: &str) -> Vec<f64> {
        self.column(field).iter().filter_map(Value::as_f64).collect()
    }

    pub fn strings(&self, field: &str) -> Vec<&str> {
        self.column(field).iter().filter_map(Value::as_str).collect()
    }

    pub fn gbif_page_url(&self) -> String {
        format!("{}/{}", GBIF_SPECIES_PAGE_URL, self.taxon_key)
    }
}
