//! Wire shapes of the remote API responses
//!
//! Only the search response is decoded into typed structs; detail items are
//! kept as raw JSON and projected field by field.

use serde::Deserialize;

/// Response body of the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,

    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// One search result entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchItemId,
}

/// The `id` object of a search result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItemId {
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
}

/// Response body of the bulk detail endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}
