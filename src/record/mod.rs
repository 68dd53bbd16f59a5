//! Flat video record and its projection from the bulk detail response
//!
//! The detail endpoint returns nested `snippet`, `contentDetails` and
//! `statistics` objects. [`VideoRecord::from_item`] flattens one item into a
//! fixed shape; any missing or wrongly-typed field becomes `None`.

use serde_json::Value;

/// Delimiter used to join the tag list into a single cell
pub const TAG_DELIMITER: &str = "|";

/// Enriched metadata for one video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoRecord {
    pub video_id: String,
    pub watch_url: String,
    pub short_url: String,
    pub embed_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
    pub duration: Option<String>,
    pub dimension: Option<String>,
    pub definition: Option<String>,
    pub licensed_content: Option<bool>,
    pub projection: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub tags: Option<String>,
    pub default_audio_language: Option<String>,
    pub default_language: Option<String>,
    pub category_id: Option<String>,
    pub thumbnail_default_url: Option<String>,
    pub thumbnail_medium_url: Option<String>,
    pub thumbnail_high_url: Option<String>,
}

impl VideoRecord {
    /// Creates a record with only the identifier and its derived URLs set
    pub fn with_id(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        Self {
            watch_url: format!("https://www.youtube.com/watch?v={}", video_id),
            short_url: format!("https://youtu.be/{}", video_id),
            embed_url: format!("https://www.youtube.com/embed/{}", video_id),
            video_id,
            ..Self::default()
        }
    }

    /// Projects one detail item into a record
    ///
    /// Returns `None` only when the item has no string `id`; every other
    /// field is optional.
    pub fn from_item(item: &Value) -> Option<Self> {
        let id = item.get("id")?.as_str()?;
        let mut record = Self::with_id(id);

        record.title = text(item, "/snippet/title");
        record.description = text(item, "/snippet/description");
        record.channel_id = text(item, "/snippet/channelId");
        record.channel_title = text(item, "/snippet/channelTitle");
        record.published_at = text(item, "/snippet/publishedAt");
        record.default_audio_language = text(item, "/snippet/defaultAudioLanguage");
        record.default_language = text(item, "/snippet/defaultLanguage");
        record.category_id = text(item, "/snippet/categoryId");
        record.tags = tags(item);
        record.thumbnail_default_url = text(item, "/snippet/thumbnails/default/url");
        record.thumbnail_medium_url = text(item, "/snippet/thumbnails/medium/url");
        record.thumbnail_high_url = text(item, "/snippet/thumbnails/high/url");

        record.duration = text(item, "/contentDetails/duration");
        record.dimension = text(item, "/contentDetails/dimension");
        record.definition = text(item, "/contentDetails/definition");
        record.licensed_content = item
            .pointer("/contentDetails/licensedContent")
            .and_then(Value::as_bool);
        record.projection = text(item, "/contentDetails/projection");

        record.view_count = count(item, "/statistics/viewCount");
        record.like_count = count(item, "/statistics/likeCount");
        record.comment_count = count(item, "/statistics/commentCount");

        Some(record)
    }
}

fn text(item: &Value, pointer: &str) -> Option<String> {
    item.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

// The API encodes counts as decimal strings; accept plain numbers too.
fn count(item: &Value, pointer: &str) -> Option<u64> {
    match item.pointer(pointer)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn tags(item: &Value) -> Option<String> {
    let tags: Vec<&str> = item
        .pointer("/snippet/tags")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();

    if tags.is_empty() {
        None
    } else {
        Some(tags.join(TAG_DELIMITER))
    }
}
