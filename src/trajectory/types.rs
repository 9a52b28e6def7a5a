use chrono::{DateTime, Local};

use crate::store::PositionRecord;

/// Time-ordered records of one aircraft with no internal gap above the
/// segmentation threshold. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    hex: String,
    records: Vec<PositionRecord>,
}

impl Trajectory {
    pub(super) fn new(records: Vec<PositionRecord>) -> Option<Self> {
        let hex = records.first()?.hex.clone();
        Some(Self { hex, records })
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn records(&self) -> &[PositionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_single_point(&self) -> bool {
        self.records.len() == 1
    }

    pub fn first(&self) -> &PositionRecord {
        &self.records[0]
    }

    pub fn last(&self) -> &PositionRecord {
        &self.records[self.records.len() - 1]
    }

    /// Record anchoring the info marker of a line. It may carry no position.
    pub fn midpoint(&self) -> &PositionRecord {
        &self.records[self.records.len() / 2]
    }

    pub fn start(&self) -> DateTime<Local> {
        self.first().timestamp
    }

    pub fn end(&self) -> DateTime<Local> {
        self.last().timestamp
    }

    /// Mean of the known altitudes, `None` when no record carries one.
    pub fn average_altitude(&self) -> Option<f64> {
        average(self.records.iter().map(|r| r.altitude_ft))
    }

    pub fn callsign(&self) -> Option<&str> {
        self.records.iter().find_map(|r| r.callsign.as_deref())
    }

    pub fn registration(&self) -> Option<&str> {
        self.records.iter().find_map(|r| r.registration.as_deref())
    }

    pub fn aircraft_type(&self) -> Option<&str> {
        self.records.iter().find_map(|r| r.aircraft_type.as_deref())
    }

    /// Every `(lat, lon)` of the trajectory, in order.
    pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.records.iter().filter_map(PositionRecord::position)
    }
}

/// Mean of the present values; missing ones are ignored, not counted as zero.
pub fn average(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
