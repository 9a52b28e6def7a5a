use askama::Template;
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::RenderError;
use super::template::MapTemplate;
use super::view::{format_time, MapSettings, MapView};
use crate::config::Config;
use crate::store::{PositionRecord, RecordStore, StoreError};
use crate::trajectory::{build_trajectories, partition_by_date};

/// Inputs of one render pass.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub records: PathBuf,
    pub output: PathBuf,
    pub settings: MapSettings,
}

impl RenderJob {
    pub fn from_config(config: &Config) -> Self {
        RenderJob {
            records: config.store.records.clone(),
            output: config.store.map.clone(),
            settings: MapSettings {
                location: config.location,
                gradient: config.gradient(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RenderOutcome {
    Written {
        path: PathBuf,
        trajectories: usize,
        dates: usize,
    },
    NoData,
    SourceNotFound(PathBuf),
}

/// Result of turning the store content into a document.
pub enum Rendered {
    Map {
        html: String,
        trajectories: usize,
        dates: usize,
    },
    NoData,
}

/// Build trajectories from `records` and render the map document.
pub fn render_records(
    records: &[PositionRecord],
    settings: &MapSettings,
) -> Result<Rendered, RenderError> {
    let all = build_trajectories(records);
    let by_date = partition_by_date(records);
    for t in &all {
        debug!(
            "{} {}: {} points from {} to {}, average altitude {:?} ft",
            t.hex(),
            t.callsign().unwrap_or("-"),
            t.len(),
            format_time(t.start()),
            format_time(t.end()),
            t.average_altitude()
        );
    }

    let Some(view) = MapView::build(records, &all, &by_date, settings) else {
        return Ok(Rendered::NoData);
    };

    let html = MapTemplate::new(&view)?.render()?;
    Ok(Rendered::Map {
        html,
        trajectories: all.len(),
        dates: by_date.len(),
    })
}

/// Load the store, render, and replace the artifact. The previous artifact
/// stays untouched unless the new one is complete.
pub fn render_pass(job: &RenderJob) -> Result<RenderOutcome, RenderError> {
    let records = match RecordStore::new(job.records.clone()).load() {
        Ok(records) => records,
        Err(StoreError::NotFound(path)) => return Ok(RenderOutcome::SourceNotFound(path)),
        Err(e) => return Err(e.into()),
    };

    match render_records(&records, &job.settings)? {
        Rendered::NoData => Ok(RenderOutcome::NoData),
        Rendered::Map {
            html,
            trajectories,
            dates,
        } => {
            write_replace(&job.output, html.as_bytes())?;
            Ok(RenderOutcome::Written {
                path: job.output.clone(),
                trajectories,
                dates,
            })
        }
    }
}

/// Render pass for long-running callers: every outcome is logged, nothing
/// is propagated.
pub fn run_render_pass(job: &RenderJob) -> Option<RenderOutcome> {
    match render_pass(job) {
        Ok(outcome) => {
            log_outcome(&outcome);
            Some(outcome)
        }
        Err(e) => {
            error!("Render failed, previous map kept: {}", e);
            None
        }
    }
}

pub fn log_outcome(outcome: &RenderOutcome) {
    match outcome {
        RenderOutcome::Written {
            path,
            trajectories,
            dates,
        } => info!(
            "Map saved as {} ({} trajectories over {} dates)",
            path.display(),
            trajectories,
            dates
        ),
        RenderOutcome::NoData => warn!("No trajectories to plot, map not written"),
        RenderOutcome::SourceNotFound(path) => {
            warn!("Record store {} not found, map not written", path.display())
        }
    }
}

/// Write to a temporary file next to `path`, then rename it over `path`.
fn write_replace(path: &Path, content: &[u8]) -> Result<(), RenderError> {
    let write_err = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".map-")
        .suffix(".html.tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(content).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
