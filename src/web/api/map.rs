use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::color::AltitudeGradient;
use crate::render::{log_outcome, render_pass, RenderOutcome};
use crate::store::{PositionRecord, StoreError};
use crate::trajectory::{build_trajectories, partition_by_date, Trajectory};
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub records: usize,
    pub aircraft: usize,
    pub last_record: Option<DateTime<Utc>>,
    /// Dates with at least one record, oldest first.
    pub dates: Vec<String>,
    pub map_written: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrajectoriesQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrajectorySummary {
    pub hex: String,
    pub callsign: Option<String>,
    pub registration: Option<String>,
    pub aircraft_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub points: usize,
    pub average_altitude_ft: Option<f64>,
    /// Color of the average altitude on the map gradient.
    pub color: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderResponse {
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectories: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<usize>,
}

impl From<RenderOutcome> for RenderResponse {
    fn from(outcome: RenderOutcome) -> Self {
        let name: &'static str = (&outcome).into();
        let (trajectories, dates) = match outcome {
            RenderOutcome::Written {
                trajectories,
                dates,
                ..
            } => (Some(trajectories), Some(dates)),
            _ => (None, None),
        };
        RenderResponse {
            outcome: name.to_string(),
            trajectories,
            dates,
        }
    }
}

fn load_or_empty(state: &AppState) -> ApiResult<Vec<PositionRecord>> {
    match state.store().load() {
        Ok(records) => Ok(records),
        Err(StoreError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "map",
    responses(
        (status = 200, description = "Record store summary", body = StatusResponse),
        (status = 500, description = "Record store unreadable", body = crate::web::api::error::ErrorResponse)
    )
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let response = blocking(move || summarize_store(&state)).await?;
    Ok((StatusCode::OK, Json(response)))
}

fn summarize_store(state: &AppState) -> ApiResult<StatusResponse> {
    let records = load_or_empty(state)?;

    let aircraft = records
        .iter()
        .map(|r| r.hex.as_str())
        .collect::<HashSet<_>>()
        .len();
    let dates = partition_by_date(&records)
        .keys()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    Ok(StatusResponse {
        records: records.len(),
        aircraft,
        last_record: records.iter().map(|r| r.timestamp.with_timezone(&Utc)).max(),
        dates,
        map_written: state.job.output.is_file(),
    })
}

#[utoipa::path(
    get,
    path = "/api/trajectories",
    tag = "map",
    params(
        ("date" = Option<String>, Query, description = "Restrict to one local date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Trajectory summaries ordered by hex then start", body = Vec<TrajectorySummary>),
        (status = 400, description = "Invalid date", body = crate::web::api::error::ErrorResponse),
        (status = 404, description = "Record store not found", body = crate::web::api::error::ErrorResponse)
    )
)]
pub async fn trajectories(
    State(state): State<AppState>,
    Query(query): Query<TrajectoriesQuery>,
) -> ApiResult<impl IntoResponse> {
    let date = query
        .date
        .as_deref()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
        .transpose()
        .map_err(|e| ApiError::Validation(format!("date: {}", e)))?;

    let summaries = blocking(move || {
        let records = state.store().load()?;
        let trajectories = match date {
            Some(date) => partition_by_date(&records)
                .remove(&date)
                .unwrap_or_default(),
            None => build_trajectories(&records),
        };

        let gradient = &state.job.settings.gradient;
        Ok(trajectories
            .iter()
            .map(|t| summarize(t, gradient))
            .collect::<Vec<_>>())
    })
    .await?;

    Ok((StatusCode::OK, Json(summaries)))
}

fn summarize(t: &Trajectory, gradient: &AltitudeGradient) -> TrajectorySummary {
    let average = t.average_altitude();
    TrajectorySummary {
        hex: t.hex().to_string(),
        callsign: t.callsign().map(String::from),
        registration: t.registration().map(String::from),
        aircraft_type: t.aircraft_type().map(String::from),
        start: t.start().with_timezone(&Utc),
        end: t.end().with_timezone(&Utc),
        points: t.len(),
        average_altitude_ft: average,
        color: gradient.color(average).to_string(),
    }
}

#[utoipa::path(
    post,
    path = "/api/render",
    tag = "map",
    responses(
        (status = 200, description = "Render pass finished", body = RenderResponse),
        (status = 500, description = "Render failed, previous map kept", body = crate::web::api::error::ErrorResponse)
    )
)]
pub async fn render(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let job = state.job.clone();
    let outcome = blocking(move || Ok(render_pass(&job)?)).await?;
    log_outcome(&outcome);

    Ok((StatusCode::OK, Json(RenderResponse::from(outcome))))
}

/// Store reads and trajectory builds stay off the async workers.
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
}
