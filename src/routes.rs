use crate::common::state::AppState;
use crate::config::Config;
use crate::{common, gbif, whales};
use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(state: &AppState) -> Router {
    #[derive(OpenApi)]
    #[openapi(info(
        title = "Whale Data API",
        description = "Whale population records with GBIF occurrence sync"
    ))]
    struct ApiDoc;

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(common::views::router(state))
        .merge(whales::views::router(state))
        .merge(gbif::views::router(state))
        .split_for_parts();

    router
        .merge(Scalar::with_url("/api/docs", api))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
}

/// `*` yields a wildcard policy without credentials. An explicit origin list
/// mirrors the requested method and headers and allows credentials; tower-http
/// panics if credentials are combined with any wildcard.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins = &config.cors_allowed_origins;
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
