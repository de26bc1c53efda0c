use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Category name used for entries without a group attribute
pub const DEFAULT_CATEGORY: &str = "Others";

/// First stream id handed out by one parse
pub const FIRST_STREAM_ID: i64 = 100;

/// How `container_extension` is derived for a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerExtension {
    /// Always `m3u8`
    #[default]
    Fixed,
    /// `m3u8` when the source URL mentions it, otherwise `ts`
    FromUrl,
}

impl ContainerExtension {
    pub fn for_url(self, url: &str) -> &'static str {
        match self {
            ContainerExtension::Fixed => "m3u8",
            ContainerExtension::FromUrl if url.contains("m3u8") => "m3u8",
            ContainerExtension::FromUrl => "ts",
        }
    }
}

impl FromStr for ContainerExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "m3u8" => Ok(ContainerExtension::Fixed),
            "from_url" | "url" => Ok(ContainerExtension::FromUrl),
            other => Err(format!("unknown extension rule '{}' (use fixed or from_url)", other)),
        }
    }
}

/// Options applied by the playlist parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub container_extension: ContainerExtension,
    /// Keep `#EXTVLCOPT:` lines on the record instead of dropping them
    pub retain_player_options: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            container_extension: ContainerExtension::Fixed,
            retain_player_options: true,
        }
    }
}

/// One live entry of the upstream playlist.
///
/// `stream_id` only identifies the entry within the parse that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    /// 1-based position among parsed entries
    pub ordinal: u32,
    pub name: String,
    pub stream_id: i64,
    /// Logo URL, empty when the entry has none
    pub icon: String,
    pub category_id: String,
    /// Playback URL as found upstream (may be empty)
    pub source_url: String,
    pub player_options: Vec<String>,
    pub container_extension: &'static str,
}

impl StreamRecord {
    pub const STREAM_TYPE: &'static str = "live";
    pub const TV_ARCHIVE: &'static str = "0";
}

/// Live category, serialized in the Xtream `get_live_categories` shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category_id")]
    pub id: String,
    #[serde(rename = "category_name")]
    pub name: String,
    pub parent_id: i32,
}

/// Streams and categories produced together by a single parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    pub streams: Vec<StreamRecord>,
    pub categories: Vec<Category>,
}

impl ParsedPlaylist {
    pub fn find_stream(&self, stream_id: i64) -> Option<&StreamRecord> {
        self.streams.iter().find(|s| s.stream_id == stream_id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}
