use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::map::{RenderResponse, StatusResponse, TrajectoriesQuery, TrajectorySummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::map::status,
        super::api::map::trajectories,
        super::api::map::render,
    ),
    components(
        schemas(
            StatusResponse,
            TrajectorySummary,
            TrajectoriesQuery,
            RenderResponse,
            ErrorResponse,
        )
    ),
    info(
        title = "Plane-O-Mat API",
        description = "Logged aircraft positions and trajectory map",
        version = "0.1.0"
    ),
    tags(
        (name = "map", description = "Record store and trajectory map")
    )
)]
pub struct ApiDoc;
