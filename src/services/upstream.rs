//! Upstream HTTP client
//!
//! Fetches the user directory, the playlist and individual stream manifests.
//! Every call is a single request with no retries and no caching.

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{UpstreamError, UpstreamSource};
use crate::models::UserDirectory;
use crate::services::metrics;

/// Upstream API Client
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    user_directory_url: String,
    playlist_url: String,
    token: String,
}

impl UpstreamClient {
    /// Create a new upstream client from configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            user_directory_url: config.user_directory_url.clone(),
            playlist_url: config.playlist_url.clone(),
            token: config.upstream_token.clone(),
        })
    }

    /// Make a GET request and return the body as text.
    /// The bearer token is only attached for the configured sources.
    async fn get_text(&self, url: &str, origin: UpstreamSource) -> Result<String, UpstreamError> {
        let mut request = self.http.get(url);
        if origin != UpstreamSource::Stream {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }

        debug!(origin = %origin, "Upstream request");

        let result = async {
            let response = request.send().await.map_err(|e| UpstreamError::Network {
                origin,
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Http {
                    origin,
                    status: status.as_u16(),
                });
            }

            response.text().await.map_err(|e| UpstreamError::Decode {
                origin,
                message: e.to_string(),
            })
        }
        .await;

        if let Err(ref e) = result {
            warn!(origin = %origin, "Upstream fetch failed: {}", e);
            metrics::record_upstream_failure(origin);
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        origin: UpstreamSource,
    ) -> Result<T, UpstreamError> {
        let text = self.get_text(url, origin).await?;
        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(500).collect();
            debug!("Response text: {}", preview);
            metrics::record_upstream_failure(origin);
            UpstreamError::Decode {
                origin,
                message: e.to_string(),
            }
        })
    }

    /// Fetch the subscriber directory
    pub async fn fetch_user_directory(&self) -> Result<UserDirectory, UpstreamError> {
        self.get_json(&self.user_directory_url, UpstreamSource::Directory)
            .await
    }

    /// Fetch the raw playlist text
    pub async fn fetch_playlist(&self) -> Result<String, UpstreamError> {
        self.get_text(&self.playlist_url, UpstreamSource::Playlist)
            .await
    }

    /// Fetch the manifest behind one stream's source URL
    pub async fn fetch_stream(&self, stream_id: i64, url: &str) -> Result<String, UpstreamError> {
        if url.is_empty() {
            metrics::record_upstream_failure(UpstreamSource::Stream);
            return Err(UpstreamError::MissingSourceUrl(stream_id));
        }
        self.get_text(url, UpstreamSource::Stream).await
    }
}
