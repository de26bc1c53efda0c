//! Builders turning parsed playlist data into Xtream responses

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::types::{
    XtreamAuthResponse, XtreamCredentials, XtreamLiveStream, XtreamServerInfo, XtreamUserInfo,
};
use crate::models::{ParsedPlaylist, StreamRecord};

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;
pub const RTMP_PORT: u16 = 8080;
pub const SERVER_PROTOCOL: &str = "http";
pub const MAX_CONNECTIONS: u32 = 1;

lazy_static! {
    /// Relative proxy paths inside a manifest (line start, or after whitespace, quote or `=`)
    static ref PROXY_PATH_REGEX: Regex =
        Regex::new(r#"(?m)(^|[\s"'=])(/proxy/ts\?[^\s"']*)"#).unwrap();
}

/// Account and server metadata for the default action
pub fn account_info(
    creds: &XtreamCredentials,
    host: &str,
    expiry: Option<DateTime<Utc>>,
    timezone: &str,
    now: DateTime<Utc>,
) -> XtreamAuthResponse {
    XtreamAuthResponse {
        user_info: XtreamUserInfo {
            username: creds.username.clone(),
            password: creds.password.clone(),
            status: "Active",
            exp_date: expiry.map(|e| e.timestamp().to_string()),
            is_trial: "0",
            active_cons: 0,
            max_connections: MAX_CONNECTIONS,
        },
        server_info: XtreamServerInfo {
            url: host.to_string(),
            port: HTTP_PORT,
            https_port: HTTPS_PORT,
            server_protocol: SERVER_PROTOCOL,
            rtmp_port: RTMP_PORT,
            timestamp_now: now.timestamp(),
            timezone: timezone.to_string(),
        },
    }
}

/// One stream with both playback links pointing back at this service
pub fn live_stream(record: &StreamRecord, creds: &XtreamCredentials) -> XtreamLiveStream {
    let url = creds.stream_url(record.stream_id);
    XtreamLiveStream {
        num: record.ordinal,
        name: record.name.clone(),
        stream_type: StreamRecord::STREAM_TYPE,
        stream_id: record.stream_id,
        stream_icon: record.icon.clone(),
        category_id: record.category_id.clone(),
        tv_archive: StreamRecord::TV_ARCHIVE,
        direct_source: url.clone(),
        stream_url: url,
        vlc_opts: record.player_options.clone(),
        container_extension: record.container_extension,
    }
}

pub fn live_streams(playlist: &ParsedPlaylist, creds: &XtreamCredentials) -> Vec<XtreamLiveStream> {
    playlist
        .streams
        .iter()
        .map(|record| live_stream(record, creds))
        .collect()
}

/// Prefix relative `/proxy/ts?...` paths with the auxiliary host.
/// Absolute URLs are left untouched.
pub fn rewrite_proxy_paths(manifest: &str, aux_host: &str) -> String {
    PROXY_PATH_REGEX
        .replace_all(manifest, |caps: &Captures| {
            format!("{}{}{}", &caps[1], aux_host, &caps[2])
        })
        .into_owned()
}

/// Minimal one-entry playlist telling playlist-only clients the account expired
pub fn expired_playlist(message: &str) -> String {
    format!("#EXTM3U\n#EXTINF:-1,{}\n", message)
}

/// Parse `stream_id` the way player clients send it: leading integer,
/// trailing text (such as `.m3u8`) ignored.
pub fn parse_stream_id(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let digits = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    raw[..sign_len + digits].parse().ok()
}
