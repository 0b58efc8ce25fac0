use super::models::HealthCheck;
use crate::common::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(healthz))
        .with_state(state.clone())
}

async fn check(state: &AppState) -> (StatusCode, Json<HealthCheck>) {
    let use_test_data = state.config.use_test_data;

    if let Err(err) = state.db.ping().await {
        tracing::warn!(error = %err, "Health check could not reach the database");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthCheck {
                status: "degraded".to_string(),
                database: "unreachable".to_string(),
                use_test_data,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(HealthCheck {
            status: "ok".to_string(),
            database: "ok".to_string(),
            use_test_data,
        }),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service and database are healthy", body = HealthCheck),
        (status = SERVICE_UNAVAILABLE, description = "Database unreachable", body = HealthCheck)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthCheck>) {
    check(&state).await
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = OK, description = "Kubernetes health check", body = HealthCheck),
        (status = SERVICE_UNAVAILABLE, description = "Database unreachable", body = HealthCheck)
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthCheck>) {
    check(&state).await
}
