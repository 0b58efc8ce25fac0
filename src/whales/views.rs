use super::models::{PopulationFilter, PopulationResponse, SeedParams, SeedResponse};
use super::services;
use crate::common::errors::ApiError;
use crate::common::state::AppState;
use axum::extract::{Query, State};
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_population))
        .routes(routes!(get_population_test))
        .routes(routes!(seed_whales))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/population",
    params(PopulationFilter),
    responses(
        (status = 200, description = "Stored whale records", body = PopulationResponse),
        (status = 500, description = "Database error"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "population",
    summary = "List whale population records",
    description = "Returns every stored record, optionally narrowed by exact species and region \
        matches. No sorting or paging is applied."
)]
pub async fn get_population(
    State(state): State<AppState>,
    Query(filter): Query<PopulationFilter>,
) -> Result<Json<PopulationResponse>, ApiError> {
    if state.config.use_test_data {
        let data = services::test_data()
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();
        return Ok(Json(PopulationResponse::new("test-data", data)));
    }

    let data = services::list_population(&state.db, &filter)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "Failed to list whale population"))?;

    Ok(Json(PopulationResponse::new("database", data)))
}

#[utoipa::path(
    get,
    path = "/population-test",
    responses(
        (status = 200, description = "Fixed three-record payload", body = PopulationResponse)
    ),
    tag = "population",
    summary = "Hardcoded whale records for client testing"
)]
pub async fn get_population_test() -> Json<PopulationResponse> {
    Json(PopulationResponse::new("test-data", services::test_data()))
}

#[utoipa::path(
    post,
    path = "/seed-whales",
    params(SeedParams),
    responses(
        (status = 200, description = "Table replaced with synthetic records", body = SeedResponse),
        (status = 400, description = "Invalid count"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "population",
    summary = "Replace all records with synthetic test data"
)]
pub async fn seed_whales(
    State(state): State<AppState>,
    Query(params): Query<SeedParams>,
) -> Result<Json<SeedResponse>, ApiError> {
    let count = services::validate_seed_count(params.count)?;
    let inserted = services::seed_whales(&state.db, count).await?;

    Ok(Json(SeedResponse {
        message: format!("Seeded {inserted} synthetic whale records"),
        count: inserted,
    }))
}
