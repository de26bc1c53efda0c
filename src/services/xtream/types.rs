//! Xtream Codes API Types
//!
//! Response shapes served by `player_api.php`.

use serde::Serialize;

/// Credentials of the requesting subscriber plus the public origin of this
/// service, used to build self-hosted playback links
#[derive(Debug, Clone)]
pub struct XtreamCredentials {
    /// Public base URL (e.g., "https://iptv.example.com")
    pub server: String,
    pub username: String,
    pub password: String,
}

impl XtreamCredentials {
    /// Build the player_api.php base URL
    pub fn api_url(&self) -> String {
        format!(
            "{}/player_api.php?username={}&password={}",
            self.server,
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password)
        )
    }

    /// Build the stream-resolution URL for one live stream
    pub fn stream_url(&self, stream_id: i64) -> String {
        format!("{}&action=stream&stream_id={}.m3u8", self.api_url(), stream_id)
    }
}

// ============================================================================
// Authentication Response Types
// ============================================================================

/// Main authentication response from player_api.php (no action)
#[derive(Debug, Serialize, Clone)]
pub struct XtreamAuthResponse {
    pub user_info: XtreamUserInfo,
    pub server_info: XtreamServerInfo,
}

/// User account information
#[derive(Debug, Serialize, Clone)]
pub struct XtreamUserInfo {
    pub username: String,
    pub password: String,
    pub status: &'static str,
    /// Unix seconds as a string, `null` for unlimited accounts
    pub exp_date: Option<String>,
    pub is_trial: &'static str,
    pub active_cons: u32,
    pub max_connections: u32,
}

/// Server information
#[derive(Debug, Serialize, Clone)]
pub struct XtreamServerInfo {
    pub url: String,
    pub port: u16,
    pub https_port: u16,
    pub server_protocol: &'static str,
    pub rtmp_port: u16,
    pub timestamp_now: i64,
    pub timezone: String,
}

// ============================================================================
// Live Stream Types
// ============================================================================

/// Live stream (channel) information
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct XtreamLiveStream {
    pub num: u32,
    pub name: String,
    pub stream_type: &'static str,
    pub stream_id: i64,
    pub stream_icon: String,
    pub category_id: String,
    pub tv_archive: &'static str,
    pub direct_source: String,
    pub stream_url: String,
    pub vlc_opts: Vec<String>,
    pub container_extension: &'static str,
}
