use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::{AppError, TextError};
use crate::models::AuthResult;
use crate::routes::{credentials, first_value};
use crate::services::{auth, xtream};
use crate::AppState;

/// Playlist flavours accepted by `/get.php`
pub const PLAYLIST_TYPES: [&str; 2] = ["m3u", "m3u_plus"];

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Query parameters for the playlist endpoint
#[derive(Debug, Default)]
pub struct GetPlaylistQuery {
    pub username: Option<String>,
    pub password: Option<String>,
    pub playlist_type: Option<String>,
}

impl GetPlaylistQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            username: first_value(pairs, "username"),
            password: first_value(pairs, "password"),
            playlist_type: first_value(pairs, "type"),
        }
    }
}

/// GET /get.php?username=&password=&type=m3u_plus
/// Relays the upstream playlist verbatim to authenticated subscribers.
pub async fn get_playlist(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, TextError> {
    let query = GetPlaylistQuery::from_pairs(&pairs);
    let (username, password) = credentials(query.username, query.password)
        .ok_or(AppError::BadRequest("missing credentials"))?;

    let playlist_type = query
        .playlist_type
        .as_deref()
        .unwrap_or("m3u")
        .to_ascii_lowercase();
    if !PLAYLIST_TYPES.contains(&playlist_type.as_str()) {
        return Err(AppError::BadRequest("unsupported playlist type").into());
    }

    match auth::authenticate(&state.upstream, &username, &password).await? {
        AuthResult::Granted { .. } => {}
        AuthResult::Expired { .. } => {
            tracing::info!(username = %username, "Serving expired-subscription playlist");
            let body = xtream::expired_playlist(&state.config.expired_message);
            return Ok(([(header::CONTENT_TYPE, PLAIN_TEXT)], body).into_response());
        }
        AuthResult::Rejected => return Err(AppError::Forbidden.into()),
    }

    let body = state.upstream.fetch_playlist().await?;
    tracing::info!(username = %username, bytes = body.len(), "Playlist relayed");

    Ok(([(header::CONTENT_TYPE, PLAIN_TEXT)], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::build_router;
    use crate::test_support::{
        body_text, get_request, spawn_upstream, test_state, test_state_with, PLAYLIST_MARKER,
    };
    use axum::http::StatusCode;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_valid_user_gets_raw_playlist() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state(&upstream));

        let response = app
            .oneshot(get_request("/get.php?username=alice&password=secret&type=m3u_plus"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), PLAIN_TEXT);
        assert_eq!(body_text(response).await, upstream.playlist);
    }

    #[tokio::test]
    async fn test_type_defaults_to_m3u() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state(&upstream));

        let response = app
            .oneshot(get_request("/get.php?username=alice&password=secret"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_expired_user_gets_synthetic_playlist() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state(&upstream));

        let response = app
            .oneshot(get_request("/get.php?username=bob&password=old&type=m3u"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.starts_with("#EXTM3U"));
        assert!(body.contains("#EXTINF:-1,Subscription expired"));
        assert!(!body.contains(PLAYLIST_MARKER));
    }

    #[tokio::test]
    async fn test_wrong_password_is_forbidden() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state(&upstream));

        let response = app
            .oneshot(get_request("/get.php?username=alice&password=wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_validation_happens_before_upstream() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state(&upstream));

        for uri in [
            "/get.php?username=alice&password=secret&type=xml",
            "/get.php?username=alice",
            "/get.php?username=&password=secret",
        ] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body_text(response).await, "Missing or wrong parameters");
        }

        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_repeated_keys_take_first_value() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state(&upstream));

        let response = app
            .clone()
            .oneshot(get_request(
                "/get.php?username=alice&password=secret&type=m3u&type=xml",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, upstream.playlist);

        let response = app
            .oneshot(get_request(
                "/get.php?username=alice&password=secret&type=xml&type=m3u",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing or wrong parameters");
    }

    #[tokio::test]
    async fn test_directory_failure_is_bad_gateway() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state_with(&upstream, |config| {
            config.user_directory_url = format!("{}/missing.json", upstream.base);
        }));

        let response = app
            .oneshot(get_request("/get.php?username=alice&password=secret"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_playlist_failure_is_bad_gateway() {
        let upstream = spawn_upstream().await;
        let app = build_router(test_state_with(&upstream, |config| {
            config.playlist_url = format!("{}/broken", upstream.base);
        }));

        let response = app
            .oneshot(get_request("/get.php?username=alice&password=secret"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(response).await, "Upstream error");
    }
}
