//! Xtream Codes Emulation
//!
//! Renders the parsed playlist and the authentication outcome in the shapes
//! Xtream Player API v2 clients expect.
//!
//! # Endpoints
//!
//! ```text
//! /get.php?username=X&password=Y&type=m3u_plus
//! /player_api.php?username=X&password=Y[&action=...]
//! ```
//!
//! Stream links handed to clients always point back at this service:
//! ```text
//! /player_api.php?username=X&password=Y&action=stream&stream_id=100.m3u8
//! ```

pub mod types;
pub mod views;

// Re-exports for convenience
pub use types::XtreamCredentials;
pub use views::{
    account_info, expired_playlist, live_streams, parse_stream_id, rewrite_proxy_paths,
};
