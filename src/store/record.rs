use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Column order of the CSV log.
pub const HEADER: [&str; 13] = [
    "timestamp",
    "callsign",
    "regis",
    "hex",
    "type",
    "desc",
    "alt",
    "vspeed",
    "lat",
    "lon",
    "track",
    "dist",
    "azimuth",
];

/// Textual cells the producers are known to write for "no value".
const NULL_PLACEHOLDERS: [&str; 6] = ["None", "null", "nan", "NaN", "N/A", "ground"];

/// One observation of one aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub timestamp: DateTime<Local>,
    pub callsign: Option<String>,
    pub registration: Option<String>,
    pub hex: String,
    pub aircraft_type: Option<String>,
    pub description: Option<String>,
    pub altitude_ft: Option<f64>,
    pub vertical_speed_fpm: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub track_deg: Option<f64>,
    pub distance_nm: Option<f64>,
    pub azimuth_deg: Option<f64>,
}

impl PositionRecord {
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    /// Local calendar date of the observation.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A CSV row as written, every cell still textual.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CsvRow {
    pub timestamp: String,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub regis: Option<String>,
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default, rename = "type")]
    pub aircraft_type: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub vspeed: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub dist: Option<String>,
    #[serde(default)]
    pub azimuth: Option<String>,
}

impl CsvRow {
    pub fn into_record(self) -> Result<PositionRecord, String> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        let hex = text(self.hex).ok_or_else(|| "missing hex identifier".to_string())?;

        Ok(PositionRecord {
            timestamp,
            callsign: text(self.callsign),
            registration: text(self.regis),
            hex,
            aircraft_type: text(self.aircraft_type),
            description: text(self.desc),
            altitude_ft: number("alt", self.alt)?,
            vertical_speed_fpm: number("vspeed", self.vspeed)?,
            lat: number("lat", self.lat)?,
            lon: number("lon", self.lon)?,
            track_deg: number("track", self.track)?,
            distance_nm: number("dist", self.dist)?,
            azimuth_deg: number("azimuth", self.azimuth)?,
        })
    }
}

impl From<&PositionRecord> for CsvRow {
    fn from(rec: &PositionRecord) -> Self {
        let num = |v: Option<f64>| v.map(|v| v.to_string());
        CsvRow {
            timestamp: rec.timestamp.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            callsign: rec.callsign.clone(),
            regis: rec.registration.clone(),
            hex: Some(rec.hex.clone()),
            aircraft_type: rec.aircraft_type.clone(),
            desc: rec.description.clone(),
            alt: num(rec.altitude_ft),
            vspeed: num(rec.vertical_speed_fpm),
            lat: num(rec.lat),
            lon: num(rec.lon),
            track: num(rec.track_deg),
            dist: num(rec.distance_nm),
            azimuth: num(rec.azimuth_deg),
        }
    }
}

/// ISO-8601 with second precision. Naive values are local wall-clock time,
/// `Z` or an explicit offset is converted to local time.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Local>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("missing timestamp".into());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("timestamp '{}' does not exist in local time", s))
}

fn text(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !NULL_PLACEHOLDERS.contains(&s.as_str()))
}

fn number(field: &str, cell: Option<String>) -> Result<Option<f64>, String> {
    match text(cell) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("field '{}' is not a number: '{}'", field, s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    fn row(timestamp: &str, hex: &str) -> CsvRow {
        CsvRow {
            timestamp: timestamp.into(),
            hex: Some(hex.into()),
            ..Default::default()
        }
    }

    #[test]
    fn naive_timestamp_is_local_wall_clock() {
        let ts = parse_timestamp("2025-06-14T10:15:30").unwrap();
        assert_eq!(
            ts.naive_local(),
            NaiveDate::from_ymd_opt(2025, 6, 14)
                .unwrap()
                .and_hms_opt(10, 15, 30)
                .unwrap()
        );
    }

    #[test]
    fn zulu_timestamp_is_utc() {
        let ts = parse_timestamp("2025-06-14T10:15:30Z").unwrap();
        let utc = ts.with_timezone(&Utc);
        assert_eq!((utc.hour(), utc.minute(), utc.second()), (10, 15, 30));
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        assert!(parse_timestamp("2025-06-14T10:15:30.250").is_ok());
    }

    #[test]
    fn written_timestamp_keeps_its_offset() {
        let ts = parse_timestamp("2025-10-26T01:20:00Z").unwrap();
        let rec = PositionRecord {
            timestamp: ts,
            callsign: None,
            registration: None,
            hex: "39c4a2".into(),
            aircraft_type: None,
            description: None,
            altitude_ft: None,
            vertical_speed_fpm: None,
            lat: None,
            lon: None,
            track_deg: None,
            distance_nm: None,
            azimuth_deg: None,
        };
        let row = CsvRow::from(&rec);
        assert!(DateTime::parse_from_rfc3339(&row.timestamp).is_ok(), "{}", row.timestamp);
        assert_eq!(row.into_record().unwrap().timestamp, ts);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn placeholders_are_null() {
        let mut r = row("2025-06-14T10:15:30", "39c4a2");
        r.callsign = Some("None".into());
        r.regis = Some("  ".into());
        r.alt = Some("ground".into());
        r.lat = Some("nan".into());
        r.lon = Some("2.67".into());
        let rec = r.into_record().unwrap();
        assert_eq!(rec.callsign, None);
        assert_eq!(rec.registration, None);
        assert_eq!(rec.altitude_ft, None);
        assert_eq!(rec.lat, None);
        assert_eq!(rec.lon, Some(2.67));
        assert_eq!(rec.position(), None);
    }

    #[test]
    fn text_cells_are_trimmed() {
        let mut r = row("2025-06-14T10:15:30", " 39c4a2 ");
        r.callsign = Some("AFR1234 ".into());
        let rec = r.into_record().unwrap();
        assert_eq!(rec.hex, "39c4a2");
        assert_eq!(rec.callsign.as_deref(), Some("AFR1234"));
    }

    #[test]
    fn missing_hex_is_malformed() {
        let mut r = row("2025-06-14T10:15:30", "");
        assert!(r.clone().into_record().is_err());
        r.hex = None;
        assert!(r.into_record().is_err());
    }

    #[test]
    fn non_numeric_altitude_is_malformed() {
        let mut r = row("2025-06-14T10:15:30", "39c4a2");
        r.alt = Some("high".into());
        let err = r.into_record().unwrap_err();
        assert!(err.contains("alt"));
    }
}
