use chrono::{Local, SubsecRound};
use log::{debug, error, info, warn};
use std::time::Duration;

use super::api::fetch_aircraft;
use super::error::IngestError;
use super::filter::{is_exciting, Filters};
use super::icao::TypeTable;
use crate::config::{Config, LocationConfig, PollConfig};
use crate::render::{run_render_pass, RenderJob};
use crate::store::{PositionRecord, RecordStore};

/// What one poll of the API produced.
#[derive(Debug, Default)]
pub struct Cycle {
    pub seen: usize,
    pub logged: Vec<PositionRecord>,
    pub excitation: bool,
}

pub struct Poller {
    client: reqwest::Client,
    endpoint: String,
    station: LocationConfig,
    poll: PollConfig,
    filters: Filters,
    types: TypeTable,
    store: RecordStore,
    job: RenderJob,
}

impl Poller {
    pub fn new(config: &Config, types: TypeTable) -> Result<Self, IngestError> {
        Ok(Self::with_client(config, types, http_client(&config.poll)?))
    }

    pub fn with_client(config: &Config, types: TypeTable, client: reqwest::Client) -> Self {
        Poller {
            client,
            endpoint: config.api_endpoint(),
            station: config.location,
            poll: config.poll.clone(),
            filters: Filters::new(config.altitude.clone(), config.filters.clone()),
            types,
            store: RecordStore::new(config.store.records.clone()),
            job: RenderJob::from_config(config),
        }
    }

    /// Download the ICAO type table and build a poller around it.
    pub async fn connect(config: &Config) -> Result<Self, IngestError> {
        let client = http_client(&config.poll)?;
        let types = TypeTable::fetch(&client, &config.poll.types_url).await?;
        Ok(Self::with_client(config, types, client))
    }

    /// Fetch aircraft around the station, log the accepted ones.
    pub async fn poll_once(&self) -> Result<Cycle, IngestError> {
        let timestamp = Local::now().trunc_subsecs(0);
        let aircraft = fetch_aircraft(&self.client, &self.endpoint).await?;

        let mut cycle = Cycle {
            seen: aircraft.len(),
            ..Default::default()
        };
        for ac in &aircraft {
            let record = ac.to_record(timestamp, &self.station, &self.types);
            if let Err(reason) = self.filters.check(&record) {
                debug!("Skipping {} ({:?})", record.hex, reason);
                continue;
            }
            info!(
                "Aircraft detected: {} {} {} alt={:?} dist={:?} az={:?}",
                record.hex,
                record.callsign.as_deref().unwrap_or("-"),
                record.aircraft_type.as_deref().unwrap_or("-"),
                record.altitude_ft,
                record.distance_nm,
                record.azimuth_deg
            );
            cycle.excitation |= is_exciting(&record);
            cycle.logged.push(record);
        }

        self.store.append(&cycle.logged)?;
        Ok(cycle)
    }

    pub fn delay_after(&self, cycle: Option<&Cycle>) -> Duration {
        match cycle {
            Some(c) if c.excitation => self.poll.active_delay,
            _ => self.poll.idle_delay,
        }
    }

    /// Poll forever. The map is rendered once at start and after every cycle
    /// that logged something.
    pub async fn run(self) {
        info!(
            "Monitoring airspace within {} NM of https://www.openstreetmap.org/#map=9/{}/{}",
            self.station.radius_nm, self.station.lat, self.station.lon
        );
        if let Err(e) = self.store.ensure_header() {
            warn!("Cannot prepare {}: {}", self.store.path().display(), e);
        }
        self.render().await;

        loop {
            let cycle = match self.poll_once().await {
                Ok(cycle) => Some(cycle),
                Err(e) => {
                    error!("API error: {}", e);
                    None
                }
            };

            if let Some(c) = &cycle {
                debug!("{} aircraft seen, {} logged", c.seen, c.logged.len());
                if !c.logged.is_empty() {
                    self.render().await;
                }
            }

            tokio::time::sleep(self.delay_after(cycle.as_ref())).await;
        }
    }

    async fn render(&self) {
        let job = self.job.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || run_render_pass(&job)).await {
            error!("Render task failed: {}", e);
        }
    }
}

fn http_client(poll: &PollConfig) -> Result<reqwest::Client, IngestError> {
    Ok(reqwest::Client::builder().timeout(poll.timeout).build()?)
}
