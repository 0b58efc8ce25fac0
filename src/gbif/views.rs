use super::jobs::SyncJobStatus;
use super::services::{self, SyncSummary};
use crate::common::errors::ApiError;
use crate::common::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(sync_gbif, sync_gbif_get))
        .routes(routes!(sync_gbif_status))
        .with_state(state.clone())
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct SyncParams {
    /// Run the sync as a background job and return immediately
    #[serde(default)]
    pub background: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SyncResponse {
    pub source: String,
    #[serde(flatten)]
    pub summary: SyncSummary,
    pub message: String,
}

async fn run_sync(state: AppState, params: SyncParams) -> Result<Response, ApiError> {
    if params.background {
        let db = state.db.clone();
        let client = state.gbif.clone();
        let job = state
            .sync_jobs
            .start(async move { services::sync_from_gbif(&db, &client).await })?;
        return Ok((StatusCode::ACCEPTED, Json(job)).into_response());
    }

    let summary = services::sync_from_gbif(&state.db, &state.gbif).await?;
    Ok(Json(SyncResponse {
        source: "GBIF".to_string(),
        message: format!(
            "Synced {} of {} GBIF occurrences",
            summary.upserted, summary.fetched
        ),
        summary,
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/sync-gbif",
    params(SyncParams),
    responses(
        (status = 200, description = "Occurrences fetched and upserted", body = SyncResponse),
        (status = 202, description = "Background sync started", body = SyncJobStatus),
        (status = 409, description = "A background sync is already running"),
        (status = 502, description = "GBIF request failed"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "sync",
    summary = "Refresh whale records from GBIF",
    description = "Fetches one page of whale occurrences from GBIF and upserts them keyed on \
        species and coordinates. Items without a name or coordinates are skipped."
)]
pub async fn sync_gbif(
    State(state): State<AppState>,
    Query(params): Query<SyncParams>,
) -> Result<Response, ApiError> {
    run_sync(state, params).await
}

#[utoipa::path(
    get,
    path = "/sync-gbif",
    params(SyncParams),
    responses(
        (status = 200, description = "Occurrences fetched and upserted", body = SyncResponse),
        (status = 202, description = "Background sync started", body = SyncJobStatus),
        (status = 409, description = "A background sync is already running"),
        (status = 502, description = "GBIF request failed")
    ),
    tag = "sync",
    summary = "Refresh whale records from GBIF (GET alias)"
)]
pub async fn sync_gbif_get(
    State(state): State<AppState>,
    Query(params): Query<SyncParams>,
) -> Result<Response, ApiError> {
    run_sync(state, params).await
}

#[utoipa::path(
    get,
    path = "/sync-gbif/status",
    responses(
        (status = 200, description = "Most recent background sync", body = SyncJobStatus),
        (status = 404, description = "No background sync has been started")
    ),
    tag = "sync"
)]
pub async fn sync_gbif_status(
    State(state): State<AppState>,
) -> Result<Json<SyncJobStatus>, ApiError> {
    state
        .sync_jobs
        .latest()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound {
            resource: "GBIF sync job".to_string(),
            id: "latest".to_string(),
        })
}
