use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::color::{AltitudeGradient, DEFAULT_CEILING_FT};

pub const DEFAULT_CONFIG_PATH: &str = "plane-o-mat.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub location: LocationConfig,
    #[serde(default)]
    pub altitude: AltitudeConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub web: WebConfig,
}

/// Surveillance point and monitored radius.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocationConfig {
    pub lat: f64,
    pub lon: f64,
    pub radius_nm: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AltitudeConfig {
    #[serde(default)]
    pub min_ft: f64,
    #[serde(default = "default_max_ft")]
    pub max_ft: f64,
    #[serde(default = "default_ceiling")]
    pub color_ceiling_ft: f64,
}

impl Default for AltitudeConfig {
    fn default() -> Self {
        Self {
            min_ft: 0.0,
            max_ft: default_max_ft(),
            color_ceiling_ft: default_ceiling(),
        }
    }
}

fn default_max_ft() -> f64 {
    10_000.0
}

fn default_ceiling() -> f64 {
    DEFAULT_CEILING_FT
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltersConfig {
    /// Callsign prefixes.
    #[serde(default)]
    pub callsign_blacklist: BTreeSet<String>,
    #[serde(default)]
    pub regis_blacklist: BTreeSet<String>,
    #[serde(default)]
    pub desc_blacklist: BTreeSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_records")]
    pub records: PathBuf,
    #[serde(default = "default_map")]
    pub map: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            records: default_records(),
            map: default_map(),
        }
    }
}

fn default_records() -> PathBuf {
    PathBuf::from("records.csv")
}

fn default_map() -> PathBuf {
    PathBuf::from("aircraft_trajectories_map.html")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_types_url")]
    pub types_url: String,
    #[serde(
        default = "default_active_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub active_delay: Duration,
    #[serde(default = "default_idle_delay", deserialize_with = "deserialize_duration")]
    pub idle_delay: Duration,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            types_url: default_types_url(),
            active_delay: default_active_delay(),
            idle_delay: default_idle_delay(),
            timeout: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.adsb.lol".to_string()
}

fn default_types_url() -> String {
    "https://raw.githubusercontent.com/wiedehopf/tar1090-db/master/icao_aircraft_types.json"
        .to_string()
}

fn default_active_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_idle_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let loc = &self.location;
        if !(-90.0..=90.0).contains(&loc.lat) {
            return Err(ConfigError::Invalid(
                "latitude must be between -90 and 90°".into(),
            ));
        }
        if !(-180.0..=180.0).contains(&loc.lon) {
            return Err(ConfigError::Invalid(
                "longitude must be between -180 and 180°".into(),
            ));
        }
        if !(loc.radius_nm > 0.0 && loc.radius_nm <= 250.0) {
            return Err(ConfigError::Invalid(
                "radius must be between 0 and 250 NM".into(),
            ));
        }

        let alt = &self.altitude;
        if alt.min_ft > alt.max_ft {
            return Err(ConfigError::Invalid(format!(
                "altitude band is empty ({} > {} ft)",
                alt.min_ft, alt.max_ft
            )));
        }
        if !(alt.color_ceiling_ft > 0.0) {
            return Err(ConfigError::Invalid(
                "color ceiling must be above 0 ft".into(),
            ));
        }
        Ok(())
    }

    pub fn gradient(&self) -> AltitudeGradient {
        AltitudeGradient::new(self.altitude.color_ceiling_ft)
    }

    pub fn api_endpoint(&self) -> String {
        format!(
            "{}/v2/lat/{}/lon/{}/dist/{}",
            self.poll.api_url.trim_end_matches('/'),
            self.location.lat,
            self.location.lon,
            self.location.radius_nm
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "location: { lat: 48.6058, lon: 2.6717, radius_nm: 5 }\n";

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::from_str(MINIMAL).unwrap();
        assert_eq!(config.altitude.color_ceiling_ft, 6000.0);
        assert_eq!(config.store.records, PathBuf::from("records.csv"));
        assert_eq!(
            config.store.map,
            PathBuf::from("aircraft_trajectories_map.html")
        );
        assert_eq!(config.poll.active_delay, Duration::from_secs(10));
        assert_eq!(config.poll.idle_delay, Duration::from_secs(60));
        assert!(config.filters.callsign_blacklist.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
location: { lat: 48.6058, lon: 2.6717, radius_nm: 5 }
altitude: { min_ft: 100, max_ft: 8000, color_ceiling_ft: 4000 }
filters:
  callsign_blacklist: [AFR, "EZY"]
  regis_blacklist: [F-GSEX]
  desc_blacklist: [H1T]
store: { records: /tmp/records.csv, map: /tmp/map.html }
poll: { api_url: "http://localhost:9000/", active_delay: 5s, idle_delay: 2m, timeout: 3s }
web: { bind: "127.0.0.1:9999" }
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.altitude.min_ft, 100.0);
        assert!(config.filters.callsign_blacklist.contains("EZY"));
        assert_eq!(config.poll.idle_delay, Duration::from_secs(120));
        assert_eq!(config.web.bind, "127.0.0.1:9999");
        assert_eq!(
            config.api_endpoint(),
            "http://localhost:9000/v2/lat/48.6058/lon/2.6717/dist/5"
        );
    }

    #[test]
    fn out_of_range_location_is_rejected() {
        let bad_lat = "location: { lat: 91, lon: 2, radius_nm: 5 }\n";
        let bad_lon = "location: { lat: 48, lon: -181, radius_nm: 5 }\n";
        let bad_radius = "location: { lat: 48, lon: 2, radius_nm: 0 }\n";
        let big_radius = "location: { lat: 48, lon: 2, radius_nm: 251 }\n";
        for yaml in [bad_lat, bad_lon, bad_radius, big_radius] {
            assert!(matches!(
                Config::from_str(yaml),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[test]
    fn bad_duration_is_a_yaml_error() {
        let yaml = format!("{MINIMAL}poll: {{ idle_delay: soon }}\n");
        assert!(matches!(Config::from_str(&yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn inverted_altitude_band_is_rejected() {
        let yaml = format!("{MINIMAL}altitude: {{ min_ft: 5000, max_ft: 1000 }}\n");
        assert!(matches!(
            Config::from_str(&yaml),
            Err(ConfigError::Invalid(_))
        ));
    }
}
