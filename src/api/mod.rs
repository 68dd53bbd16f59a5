//! Remote video API collaborator
//!
//! This module defines the two endpoints the harvester depends on:
//! - a paginated search endpoint returning video ids
//! - a bulk detail endpoint returning full records for up to 50 ids
//!
//! The [`VideoApi`] trait is the seam between the harvest engine and the
//! network; [`YouTubeClient`] is the HTTP implementation.

mod client;
mod schema;

pub use client::{build_http_client, YouTubeClient};
pub use schema::{SearchItem, SearchItemId, SearchResponse, VideoListResponse};

use crate::window::Window;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Kind marker the search endpoint uses for video results
pub const VIDEO_KIND: &str = "youtube#video";

/// Maximum ids accepted by the bulk detail endpoint in one request
pub const MAX_DETAIL_BATCH: usize = 50;

/// Failures reported by the remote API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server signalled throttling or quota denial (HTTP 403/429)
    #[error("rate limited (HTTP {status}): {message}")]
    RateLimited { status: u16, message: String },

    /// Any other failure: timeouts, connection resets, unexpected statuses
    #[error("transient failure: {0}")]
    Transient(String),
}

impl ApiError {
    /// Classifies an HTTP status that was not a success
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 403 || status == 429 {
            Self::RateLimited { status, message }
        } else {
            Self::Transient(format!("HTTP {}: {}", status, message))
        }
    }

    /// Returns true for throttling failures
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::from_status(status.as_u16(), e.to_string()),
            None => Self::Transient(e.to_string()),
        }
    }
}

/// Result ordering accepted by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SearchOrder {
    #[default]
    #[serde(rename = "relevance")]
    Relevance,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "viewCount", alias = "view-count")]
    ViewCount,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "videoCount", alias = "result-count")]
    VideoCount,
}

impl SearchOrder {
    /// The value sent as the `order` query parameter
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
            Self::Rating => "rating",
            Self::ViewCount => "viewCount",
            Self::Title => "title",
            Self::VideoCount => "videoCount",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// One page request against the search endpoint
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub order: SearchOrder,
    pub page_size: u32,
    pub page_token: Option<&'a str>,
    pub window: Window,
}

/// One search hit before kind filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

impl SearchHit {
    /// A video hit with the given id
    pub fn video(id: impl Into<String>) -> Self {
        Self {
            kind: Some(VIDEO_KIND.to_string()),
            video_id: Some(id.into()),
        }
    }

    /// Returns the id if this hit is a video
    pub fn as_video_id(&self) -> Option<&str> {
        match self.kind.as_deref() {
            Some(VIDEO_KIND) => self.video_id.as_deref(),
            _ => None,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,

    /// Continuation token for the next page, absent on the last page
    pub continuation: Option<String>,
}

/// The remote operations the harvester needs
///
/// Implementations issue exactly one remote request per method call; retry
/// and backoff are layered on top by the harvest engine.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Fetches one page of search results
    async fn search(&self, request: &SearchRequest<'_>) -> Result<SearchPage, ApiError>;

    /// Fetches full records for up to [`MAX_DETAIL_BATCH`] ids
    ///
    /// Items are returned as raw JSON so that a malformed record never fails
    /// the whole batch; projection happens in [`crate::record`].
    async fn videos(&self, ids: &[String]) -> Result<Vec<serde_json::Value>, ApiError>;
}

#[async_trait]
impl<T: VideoApi + ?Sized> VideoApi for &T {
    async fn search(&self, request: &SearchRequest<'_>) -> Result<SearchPage, ApiError> {
        (**self).search(request).await
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<serde_json::Value>, ApiError> {
        (**self).videos(ids).await
    }
}
