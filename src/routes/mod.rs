pub mod clients;
pub mod forms;
pub mod health;
pub mod metrics;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Request body cap, enforced by the router layer and when handlers read a body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the API router. The Prometheus endpoint is mounted separately by the
/// binary since it owns the recorder handle.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.site_url);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/clients", get(clients::list_client_logos))
        .route(
            "/api/contact",
            post(forms::submit_contact).fallback(forms::method_not_allowed),
        )
        .route(
            "/api/quote",
            post(forms::submit_quote).fallback(forms::method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

fn cors_layer(site_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(site_url.trim_end_matches('/')) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(site_url, "SITE_URL is not a valid origin, cross-origin requests disabled");
            layer
        }
    }
}
