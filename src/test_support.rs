//! Shared fixtures for router tests: a fake upstream on a loopback port and
//! helpers to drive the app with `oneshot`.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::models::ContainerExtension;
use crate::services::upstream::UpstreamClient;
use crate::AppState;

pub const TOKEN: &str = "test-token";
pub const AUX_HOST: &str = "https://aux.example.com";
pub const PUBLIC_HOST: &str = "iptv.example.com";

/// Title of the first entry, used to recognise the real playlist
pub const PLAYLIST_MARKER: &str = "News One";
pub const PLAYLIST_ENTRIES: usize = 3;

const USERS: &str = r#"{
    "b": {"username": "bob", "password": "old", "expire_date": "2000-01-01 00:00:00"},
    "a": {"username": "alice", "password": "secret", "expire_date": "2099-01-01"}
}"#;

const MANIFEST: &str = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10,\n/proxy/ts?seg=1\n#EXTINF:10,\nhttps://cdn.example.com/seg2.ts\n";

pub struct FakeUpstream {
    pub base: String,
    pub playlist: String,
    hits: Arc<AtomicUsize>,
}

impl FakeUpstream {
    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn count_hits(
    State(hits): State<Arc<AtomicUsize>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

async fn users(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => {
            ([(header::CONTENT_TYPE, "application/json")], USERS).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn stream(headers: HeaderMap) -> Response {
    // stream hosts never see the token
    if headers.contains_key(header::AUTHORIZATION) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    MANIFEST.into_response()
}

/// Start a fake upstream serving the directory, the playlist and one stream
pub async fn spawn_upstream() -> FakeUpstream {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let playlist = format!(
        "#EXTM3U\n\
#EXTINF:-1 tvg-logo=\"http://logo.example.com/1.png\" group-title=\"News\",{}\n\
#EXTVLCOPT:http-user-agent=TestAgent\n\
{}/streams/one.m3u8\n\
#EXTINF:-1,Broken Channel\n\
{}/broken\n\
#EXTINF:-1 group-title=\"News\",No Url\n",
        PLAYLIST_MARKER, base, base
    );

    let hits = Arc::new(AtomicUsize::new(0));
    let body = playlist.clone();
    let app = Router::new()
        .route("/users.json", get(users))
        .route(
            "/playlist.m3u",
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        )
        .route("/streams/one.m3u8", get(stream))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .layer(middleware::from_fn_with_state(hits.clone(), count_hits));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base,
        playlist,
        hits,
    }
}

pub fn test_config(upstream: &FakeUpstream) -> Config {
    Config {
        port: 0,
        public_base_url: None,
        server_timezone: "Europe/Istanbul".to_string(),
        user_directory_url: format!("{}/users.json", upstream.base),
        playlist_url: format!("{}/playlist.m3u", upstream.base),
        upstream_token: TOKEN.to_string(),
        auxiliary_proxy_host: Some(AUX_HOST.to_string()),
        container_extension: ContainerExtension::Fixed,
        retain_player_options: true,
        expired_message: "Subscription expired".to_string(),
        fetch_timeout_ms: 5_000,
        user_agent: "xtream-relay-tests".to_string(),
    }
}

pub fn test_state(upstream: &FakeUpstream) -> Arc<AppState> {
    test_state_with(upstream, |_| {})
}

pub fn test_state_with(upstream: &FakeUpstream, customize: impl FnOnce(&mut Config)) -> Arc<AppState> {
    let mut config = test_config(upstream);
    customize(&mut config);
    let upstream = UpstreamClient::new(&config).unwrap();
    Arc::new(AppState {
        config,
        upstream,
        start_time: Instant::now(),
    })
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, PUBLIC_HOST)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
