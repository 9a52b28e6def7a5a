use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;

use crate::render::{MapTemplate, MapView, NoDataTemplate};
use crate::store::StoreError;
use crate::trajectory::{build_trajectories, partition_by_date};
use crate::web::state::AppState;

/// The map built from the store as it is now, without touching the artifact.
pub async fn live_map(State(state): State<AppState>) -> Response {
    match tokio::task::spawn_blocking(move || live_page(&state)).await {
        Ok(response) => response,
        Err(e) => {
            error!("Live map task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                NoDataTemplate::new(e.to_string()),
            )
                .into_response()
        }
    }
}

fn live_page(state: &AppState) -> Response {
    let records = match state.store().load() {
        Ok(records) => records,
        Err(StoreError::NotFound(path)) => {
            return NoDataTemplate::new(format!("{} not found", path.display())).into_response()
        }
        Err(e) => {
            error!("Cannot load records: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                NoDataTemplate::new(e.to_string()),
            )
                .into_response();
        }
    };

    let all = build_trajectories(&records);
    let by_date = partition_by_date(&records);
    let Some(view) = MapView::build(&records, &all, &by_date, &state.job.settings) else {
        return NoDataTemplate::new("no positioned record yet").into_response();
    };

    match MapTemplate::new(&view) {
        Ok(page) => page.into_response(),
        Err(e) => {
            error!("Cannot serialize map view: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                NoDataTemplate::new(e.to_string()),
            )
                .into_response()
        }
    }
}
