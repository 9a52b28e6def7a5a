use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::color::{AltitudeGradient, Rgb};
use crate::config::LocationConfig;
use crate::store::PositionRecord;
use crate::trajectory::{average, Trajectory};

pub const METERS_PER_NM: f64 = 1852.0;

/// Key of the layer holding every date.
pub const ALL_DATES: &str = "all";

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const LEGEND_STOPS: usize = 7;

#[derive(Debug, Clone, Copy)]
pub struct MapSettings {
    pub location: LocationConfig,
    pub gradient: AltitudeGradient,
}

/// Everything the map document draws, precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub surveillance: Surveillance,
    pub last_record: Option<String>,
    pub layers: Vec<DateLayer>,
    pub legend: Legend,
}

#[derive(Debug, Clone, Serialize)]
pub struct Surveillance {
    pub lat: f64,
    pub lon: f64,
    pub radius_nm: f64,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateLayer {
    pub key: String,
    pub label: String,
    pub trajectories: Vec<TrajectoryFeature>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrajectoryFeature {
    Point {
        position: [f64; 2],
        color: Rgb,
        info: PointInfo,
    },
    Track {
        segments: Vec<Segment>,
        start: Marker,
        end: Marker,
        anchor: [f64; 2],
        info: TrackInfo,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: [f64; 2],
    pub altitude_ft: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointInfo {
    pub hex: String,
    pub callsign: Option<String>,
    pub registration: Option<String>,
    pub aircraft_type: Option<String>,
    pub timestamp: String,
    pub altitude_ft: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackInfo {
    pub hex: String,
    pub callsign: Option<String>,
    pub registration: Option<String>,
    pub aircraft_type: Option<String>,
    pub start: String,
    pub end: String,
    pub average_altitude_ft: Option<f64>,
    pub points: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub ceiling_ft: f64,
    pub stops: Vec<LegendStop>,
    pub unknown: Rgb,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendStop {
    pub altitude_ft: f64,
    pub color: Rgb,
}

impl MapView {
    /// `None` when there is nothing to plot.
    pub fn build(
        records: &[PositionRecord],
        all: &[Trajectory],
        by_date: &BTreeMap<NaiveDate, Vec<Trajectory>>,
        settings: &MapSettings,
    ) -> Option<Self> {
        let center = center_of(all)?;
        let gradient = &settings.gradient;

        let mut layers = Vec::with_capacity(by_date.len() + 1);
        layers.push(DateLayer {
            key: ALL_DATES.to_string(),
            label: "All dates".to_string(),
            trajectories: features(all, gradient),
        });
        for (date, trajectories) in by_date {
            layers.push(DateLayer {
                key: date.format("%Y-%m-%d").to_string(),
                label: date_label(*date),
                trajectories: features(trajectories, gradient),
            });
        }

        let loc = settings.location;
        Some(MapView {
            center,
            surveillance: Surveillance {
                lat: loc.lat,
                lon: loc.lon,
                radius_nm: loc.radius_nm,
                radius_m: loc.radius_nm * METERS_PER_NM,
            },
            last_record: records.iter().map(|r| r.timestamp).max().map(format_time),
            layers,
            legend: Legend {
                ceiling_ft: gradient.ceiling_ft(),
                stops: gradient
                    .stops(LEGEND_STOPS)
                    .into_iter()
                    .map(|(altitude_ft, color)| LegendStop { altitude_ft, color })
                    .collect(),
                unknown: Rgb::GRAY,
            },
        })
    }

    pub fn all_dates(&self) -> &DateLayer {
        &self.layers[0]
    }
}

/// ISO date plus weekday, independent of the process locale.
pub fn date_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
    format!("{} ({})", date.format("%Y-%m-%d"), weekday)
}

pub fn format_time(ts: DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn center_of(trajectories: &[Trajectory]) -> Option<[f64; 2]> {
    let (lat, lon, n) = trajectories
        .iter()
        .flat_map(|t| t.positions())
        .fold((0.0, 0.0, 0usize), |(lat, lon, n), (la, lo)| {
            (lat + la, lon + lo, n + 1)
        });
    (n > 0).then(|| [lat / n as f64, lon / n as f64])
}

fn features(trajectories: &[Trajectory], gradient: &AltitudeGradient) -> Vec<TrajectoryFeature> {
    trajectories
        .iter()
        .filter_map(|t| feature(t, gradient))
        .collect()
}

fn feature(trajectory: &Trajectory, gradient: &AltitudeGradient) -> Option<TrajectoryFeature> {
    let points: Vec<([f64; 2], Option<f64>)> = trajectory
        .records()
        .iter()
        .filter_map(|r| r.position().map(|(lat, lon)| ([lat, lon], r.altitude_ft)))
        .collect();

    let owned = |s: Option<&str>| s.map(str::to_string);

    if let [(position, altitude_ft)] = points.as_slice() {
        let record = trajectory.first();
        return Some(TrajectoryFeature::Point {
            position: *position,
            color: gradient.color(*altitude_ft),
            info: PointInfo {
                hex: trajectory.hex().to_string(),
                callsign: record.callsign.clone(),
                registration: record.registration.clone(),
                aircraft_type: record.aircraft_type.clone(),
                timestamp: format_time(record.timestamp),
                altitude_ft: *altitude_ft,
            },
        });
    }

    let (first, last) = (points.first()?, points.last()?);
    let segments = points
        .windows(2)
        .map(|pair| Segment {
            from: pair[0].0,
            to: pair[1].0,
            color: gradient.color(average([pair[0].1, pair[1].1])),
        })
        .collect();

    Some(TrajectoryFeature::Track {
        segments,
        start: Marker {
            position: first.0,
            altitude_ft: first.1,
        },
        end: Marker {
            position: last.0,
            altitude_ft: last.1,
        },
        anchor: trajectory
            .midpoint()
            .position()
            .map(|(lat, lon)| [lat, lon])
            .unwrap_or(points[points.len() / 2].0),
        info: TrackInfo {
            hex: trajectory.hex().to_string(),
            callsign: owned(trajectory.callsign()),
            registration: owned(trajectory.registration()),
            aircraft_type: owned(trajectory.aircraft_type()),
            start: format_time(trajectory.start()),
            end: format_time(trajectory.end()),
            average_altitude_ft: trajectory.average_altitude(),
            points: points.len(),
        },
    })
}
