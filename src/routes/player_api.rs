//! Xtream Player API emulation
//!
//! `/player_api.php` dispatches on `action` after authenticating the caller
//! and parsing a fresh copy of the upstream playlist.

use axum::{
    extract::{Host, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use url::Url;

use crate::error::{AppError, JsonError};
use crate::models::{AuthResult, ParsedPlaylist};
use crate::routes::{credentials, first_value, non_empty};
use crate::services::xtream::{self, XtreamCredentials};
use crate::services::{auth, m3u_parser};
use crate::AppState;

const ACTION_GET_LIVE_CATEGORIES: &str = "get_live_categories";
const ACTION_GET_LIVE_STREAMS: &str = "get_live_streams";
const ACTION_STREAM: &str = "stream";

const MPEGURL: &str = "application/vnd.apple.mpegurl; charset=utf-8";

/// Query parameters for the player API
#[derive(Debug, Default)]
pub struct PlayerApiQuery {
    pub username: Option<String>,
    pub password: Option<String>,
    pub action: Option<String>,
    pub stream_id: Option<String>,
}

impl PlayerApiQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            username: first_value(pairs, "username"),
            password: first_value(pairs, "password"),
            action: first_value(pairs, "action"),
            stream_id: first_value(pairs, "stream_id"),
        }
    }
}

/// Hostname of the request, without port
fn request_hostname(host: Option<&str>) -> String {
    host.and_then(|h| Url::parse(&format!("http://{}", h)).ok())
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string())
}

/// GET /player_api.php?username=&password=&action=&stream_id=
pub async fn player_api(
    State(state): State<Arc<AppState>>,
    host: Option<Host>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, JsonError> {
    let query = PlayerApiQuery::from_pairs(&pairs);
    let (username, password) = credentials(query.username, query.password)
        .ok_or(AppError::BadRequest("missing credentials"))?;
    let action = non_empty(query.action)
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let expiry = match auth::authenticate(&state.upstream, &username, &password).await? {
        AuthResult::Granted { expiry } => expiry,
        AuthResult::Expired { .. } => return Err(AppError::SubscriptionExpired.into()),
        AuthResult::Rejected => return Err(AppError::Forbidden.into()),
    };

    let text = state.upstream.fetch_playlist().await?;
    let playlist = m3u_parser::parse(&text, state.parse_options());

    let hostname = request_hostname(host.as_ref().map(|Host(h)| h.as_str()));
    let creds = XtreamCredentials {
        server: state
            .config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", hostname)),
        username,
        password,
    };

    tracing::debug!(action = %action, streams = playlist.streams.len(), "Player API request");

    match action.as_str() {
        "" => Ok(Json(xtream::account_info(
            &creds,
            &hostname,
            expiry,
            &state.config.server_timezone,
            Utc::now(),
        ))
        .into_response()),
        ACTION_GET_LIVE_CATEGORIES => Ok(Json(playlist.categories).into_response()),
        ACTION_GET_LIVE_STREAMS => Ok(Json(xtream::live_streams(&playlist, &creds)).into_response()),
        ACTION_STREAM => resolve_stream(&state, &playlist, query.stream_id.as_deref()).await,
        other => {
            tracing::debug!(action = other, "Unsupported action");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                "[]",
            )
                .into_response())
        }
    }
}

/// Resolve one stream id to its upstream manifest
async fn resolve_stream(
    state: &AppState,
    playlist: &ParsedPlaylist,
    raw_stream_id: Option<&str>,
) -> Result<Response, JsonError> {
    let stream_id = raw_stream_id
        .and_then(xtream::parse_stream_id)
        .ok_or(AppError::BadRequest("missing or invalid stream_id"))?;

    let record = playlist
        .find_stream(stream_id)
        .ok_or(AppError::NotFound("unknown stream_id"))?;

    let manifest = state
        .upstream
        .fetch_stream(stream_id, &record.source_url)
        .await?;

    let manifest = match state.config.auxiliary_proxy_host.as_deref() {
        Some(aux_host) => xtream::rewrite_proxy_paths(&manifest, aux_host),
        None => manifest,
    };

    tracing::info!(stream_id, name = %record.name, "Stream resolved");

    Ok(([(header::CONTENT_TYPE, MPEGURL)], manifest).into_response())
}
