//! Geometry for the distribution map, independent of the map widget.

use crate::data::{OccurrenceTable, LATITUDE, LONGITUDE, SCIENTIFIC_NAME};

pub const PARALLEL_STEP: f64 = 30.0;
pub const MERIDIAN_STEP: f64 = 60.0;

/// Points sampled along each graticule line so it bends with the projection.
const GRATICULE_SEGMENTS: usize = 36;

const LABEL_EDGE_LONGITUDE: f64 = 175.0;
const LABEL_EDGE_LATITUDE: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MapPlot {
    pub label: String,
    /// `(longitude, latitude)` pairs in record order.
    pub points: Vec<(f64, f64)>,
}

impl MapPlot {
    /// Pairs the longitude and latitude columns positionally.
    ///
    /// The columns are only aligned when every record carried both fields;
    /// otherwise the shorter column wins and trailing values are dropped.
    pub fn from_table(table: &OccurrenceTable, fallback_label: &str) -> Self {
        let longitudes = table.numbers(LONGITUDE);
        let latitudes = table.numbers(LATITUDE);

        if longitudes.len() != latitudes.len() {
            tracing::warn!(
                longitudes = longitudes.len(),
                latitudes = latitudes.len(),
                "coordinate columns differ in length, pairing by position"
            );
        }

        let points = longitudes.into_iter().zip(latitudes).collect();
        let label = table
            .strings(SCIENTIFIC_NAME)
            .first()
            .and_then(|name| binomial(name))
            .unwrap_or_else(|| fallback_label.trim().to_string());

        Self { label, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The "Genus species" part of a full scientific name.
pub fn binomial(scientific_name: &str) -> Option<String> {
    let tokens: Vec<&str> = scientific_name.split_whitespace().take(2).collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// One graticule line with the degree label drawn at its end.
#[derive(Debug, Clone, PartialEq)]
pub struct GraticuleLine {
    /// `(latitude, longitude)` nodes along the line.
    pub nodes: Vec<(f64, f64)>,
    pub label: String,
    /// `(latitude, longitude)` of the label: parallels are labelled on the
    /// right edge, meridians along the top.
    pub label_at: (f64, f64),
}

/// Parallels every 30 degrees from -90 to 90, meridians every 60 degrees from
/// -180 to 180.
pub fn graticule() -> Vec<GraticuleLine> {
    let mut lines = Vec::new();

    let mut lat = -90.0;
    while lat <= 90.0 {
        lines.push(GraticuleLine {
            nodes: (0..=GRATICULE_SEGMENTS)
                .map(|i| (lat, -180.0 + 360.0 * i as f64 / GRATICULE_SEGMENTS as f64))
                .collect(),
            label: latitude_label(lat),
            label_at: (lat, LABEL_EDGE_LONGITUDE),
        });
        lat += PARALLEL_STEP;
    }

    let mut lon = -180.0;
    while lon <= 180.0 {
        lines.push(GraticuleLine {
            nodes: (0..=GRATICULE_SEGMENTS)
                .map(|i| (-85.0 + 170.0 * i as f64 / GRATICULE_SEGMENTS as f64, lon))
                .collect(),
            label: longitude_label(lon),
            label_at: (LABEL_EDGE_LATITUDE, lon),
        });
        lon += MERIDIAN_STEP;
    }

    lines
}

pub fn latitude_label(lat: f64) -> String {
    match lat {
        l if l > 0.0 => format!("{}°N", l.round() as i64),
        l if l < 0.0 => format!("{}°S", (-l).round() as i64),
        _ => "0°".to_string(),
    }
}

pub fn longitude_label(lon: f64) -> String {
    match lon {
        l if l.abs() >= 180.0 => "180°".to_string(),
        l if l > 0.0 => format!("{}°E", l.round() as i64),
        l if l < 0.0 => format!("{}°W", (-l).round() as i64),
        _ => "0°".to_string(),
    }
}
