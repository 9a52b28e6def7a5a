use chrono::{DateTime, Local};
use serde::Deserialize;

use super::error::IngestError;
use super::geodesy::{azimuth_deg, distance_nm};
use super::icao::TypeTable;
use crate::config::LocationConfig;
use crate::store::PositionRecord;

/// Body of the adsb.lol `v2/lat/{lat}/lon/{lon}/dist/{radius}` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointResponse {
    #[serde(default)]
    pub ac: Vec<Aircraft>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aircraft {
    pub hex: String,
    /// Callsign, space padded.
    #[serde(default)]
    pub flight: Option<String>,
    /// Registration.
    #[serde(default)]
    pub r: Option<String>,
    /// ICAO type designator.
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub alt_baro: Option<BaroAltitude>,
    #[serde(default)]
    pub baro_rate: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub track: Option<f64>,
}

/// Barometric altitude in feet, or a label such as `"ground"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BaroAltitude {
    Feet(f64),
    Label(String),
}

impl BaroAltitude {
    pub fn feet(&self) -> Option<f64> {
        match self {
            BaroAltitude::Feet(ft) => Some(*ft),
            BaroAltitude::Label(_) => None,
        }
    }
}

pub async fn fetch_aircraft(
    client: &reqwest::Client,
    endpoint: &str,
) -> Result<Vec<Aircraft>, IngestError> {
    let response: PointResponse = client
        .get(endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(response.ac)
}

impl Aircraft {
    /// The log row for this aircraft as seen from `station` at `timestamp`.
    pub fn to_record(
        &self,
        timestamp: DateTime<Local>,
        station: &LocationConfig,
        types: &TypeTable,
    ) -> PositionRecord {
        let clean = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let aircraft_type = clean(&self.t);
        let description = aircraft_type
            .as_deref()
            .and_then(|t| types.describe(t))
            .map(String::from);

        let (distance_nm, azimuth_deg) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => (
                Some(distance_nm(station.lat, station.lon, lat, lon)),
                Some(azimuth_deg(station.lat, station.lon, lat, lon).round() % 360.0),
            ),
            _ => (None, None),
        };

        PositionRecord {
            timestamp,
            callsign: clean(&self.flight),
            registration: clean(&self.r),
            hex: self.hex.trim().to_string(),
            aircraft_type,
            description,
            altitude_ft: self.alt_baro.as_ref().and_then(BaroAltitude::feet),
            vertical_speed_fpm: self.baro_rate,
            lat: self.lat,
            lon: self.lon,
            track_deg: self.track.map(f64::round),
            distance_nm,
            azimuth_deg,
        }
    }
}
