use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::{
    Category, ParseOptions, ParsedPlaylist, StreamRecord, DEFAULT_CATEGORY, FIRST_STREAM_ID,
};

/// Per-entry marker starting an info line
pub const EXTINF_MARKER: &str = "#EXTINF";

/// Prefix of VLC player-option lines placed between an info line and its URL
pub const PLAYER_OPTION_PREFIX: &str = "#EXTVLCOPT:";

lazy_static! {
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, Default, PartialEq, Eq)]
struct ExtinfData<'a> {
    attributes: HashMap<&'a str, &'a str>,
    title: &'a str,
}

impl<'a> ExtinfData<'a> {
    fn attr(&self, key: &str) -> Option<&'a str> {
        self.attributes.get(key).copied()
    }
}

/// Extract `key="value"` pairs from the attribute part of an info line.
///
/// The first occurrence of a key wins. Values are taken verbatim.
pub fn parse_attributes(header: &str) -> HashMap<&str, &str> {
    let mut attributes = HashMap::new();
    for caps in ATTR_REGEX.captures_iter(header) {
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            attributes.entry(key.as_str()).or_insert(value.as_str());
        }
    }
    attributes
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-logo="..." group-title="...",Title
///
/// The title is whatever follows the last comma. Without a comma the whole
/// line minus the marker is the title.
fn parse_extinf(line: &str) -> Option<ExtinfData<'_>> {
    let content = line.strip_prefix(EXTINF_MARKER)?;
    let content = content.strip_prefix(':').unwrap_or(content);

    let (header, title) = match content.rfind(',') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, content),
    };

    Some(ExtinfData {
        attributes: parse_attributes(header),
        title: title.trim(),
    })
}

fn is_info_line(line: &str) -> bool {
    line.starts_with(EXTINF_MARKER)
}

/// Convert raw M3U text into stream records and their category table.
///
/// Pure: the same text and options always yield the same result. Empty
/// input yields an empty playlist.
pub fn parse(text: &str, options: ParseOptions) -> ParsedPlaylist {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut streams: Vec<StreamRecord> = Vec::new();
    let mut categories: Vec<Category> = Vec::new();
    let mut category_ids: HashMap<String, String> = HashMap::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(extinf) = parse_extinf(lines[i]) else {
            i += 1;
            continue;
        };

        let category_name = extinf
            .attr("group-title")
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let category_id = match category_ids.get(category_name) {
            Some(id) => id.clone(),
            None => {
                let id = (categories.len() + 1).to_string();
                categories.push(Category {
                    id: id.clone(),
                    name: category_name.to_string(),
                    parent_id: 0,
                });
                category_ids.insert(category_name.to_string(), id.clone());
                id
            }
        };

        // Option lines never become the URL
        let mut j = i + 1;
        let mut player_options = Vec::new();
        while j < lines.len() && lines[j].starts_with(PLAYER_OPTION_PREFIX) {
            if options.retain_player_options {
                player_options.push(lines[j].to_string());
            }
            j += 1;
        }

        // The next line is the URL, unless it already starts another entry
        let source_url = match lines.get(j) {
            Some(line) if !is_info_line(line) => {
                j += 1;
                line.trim().to_string()
            }
            _ => String::new(),
        };

        let index = streams.len();
        streams.push(StreamRecord {
            ordinal: index as u32 + 1,
            name: extinf.title.to_string(),
            stream_id: FIRST_STREAM_ID + index as i64,
            icon: extinf.attr("tvg-logo").unwrap_or_default().to_string(),
            category_id,
            container_extension: options.container_extension.for_url(&source_url),
            source_url,
            player_options,
        });

        i = j;
    }

    tracing::debug!(
        streams = streams.len(),
        categories = categories.len(),
        "Playlist parsed"
    );

    ParsedPlaylist {
        streams,
        categories,
    }
}
