use crate::config::{AltitudeConfig, FiltersConfig};
use crate::store::PositionRecord;

/// Light single-piston aircraft do not speed up polling.
const QUIET_DESCRIPTION: &str = "L1P";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    OutsideAltitudeBand,
    CallsignBlacklisted,
    RegistrationBlacklisted,
    DescriptionBlacklisted,
}

/// Altitude band and blacklists applied to every detection before logging.
#[derive(Debug, Clone)]
pub struct Filters {
    altitude: AltitudeConfig,
    lists: FiltersConfig,
}

impl Filters {
    pub fn new(altitude: AltitudeConfig, lists: FiltersConfig) -> Self {
        Filters { altitude, lists }
    }

    pub fn check(&self, record: &PositionRecord) -> Result<(), Rejection> {
        match record.altitude_ft {
            Some(alt) if alt >= self.altitude.min_ft && alt <= self.altitude.max_ft => {}
            _ => return Err(Rejection::OutsideAltitudeBand),
        }

        if let Some(callsign) = &record.callsign {
            if self
                .lists
                .callsign_blacklist
                .iter()
                .any(|prefix| callsign.starts_with(prefix.as_str()))
            {
                return Err(Rejection::CallsignBlacklisted);
            }
        }
        if let Some(regis) = &record.registration {
            if self.lists.regis_blacklist.contains(regis) {
                return Err(Rejection::RegistrationBlacklisted);
            }
        }
        if let Some(desc) = &record.description {
            if self.lists.desc_blacklist.contains(desc) {
                return Err(Rejection::DescriptionBlacklisted);
            }
        }
        Ok(())
    }
}

/// Whether a logged record should shorten the next poll delay.
pub fn is_exciting(record: &PositionRecord) -> bool {
    record.description.as_deref() != Some(QUIET_DESCRIPTION)
}
