pub mod health;
pub mod player_api;
pub mod playlist;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{AppError, TextError};
use crate::services::metrics;
use crate::AppState;

/// Build the HTTP router with all middleware attached
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Xtream surface
        .route("/get.php", get(playlist::get_playlist))
        .route("/player_api.php", get(player_api::player_api))
        // Operational endpoints
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .fallback(not_found)
        // Middleware
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Count and log every request by route and final status
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    metrics::record_request(&endpoint, status.as_u16());

    if status.is_server_error() {
        tracing::warn!(%method, endpoint = %endpoint, status = status.as_u16(), elapsed = ?start.elapsed(), "Request failed");
    } else {
        tracing::info!(%method, endpoint = %endpoint, status = status.as_u16(), elapsed = ?start.elapsed(), "Request served");
    }

    response
}

/// Last-resort conversion of a handler panic into a 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    TextError(AppError::Internal(message)).into_response()
}

/// First value of `key` in a raw query; repeated keys never reject the request
pub(crate) fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Treat absent and empty query values alike
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Both credentials, or `None` when either is missing
pub(crate) fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> Option<(String, String)> {
    Some((non_empty(username)?, non_empty(password)?))
}
