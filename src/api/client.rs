//! HTTP implementation of the video API
//!
//! This module handles:
//! - Building the reqwest client with timeouts and compression
//! - Issuing search and bulk detail requests
//! - Classifying failed responses into [`ApiError`] variants

use crate::api::schema::{SearchResponse, VideoListResponse};
use crate::api::{ApiError, SearchHit, SearchPage, SearchRequest, VideoApi};
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// Parts requested from the bulk detail endpoint
const DETAIL_PARTS: &str = "snippet,contentDetails,statistics";

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The API configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the YouTube Data API v3 (or any server speaking its shape)
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    /// Creates a client against `config.base_url` using the given key
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

/// Maps a non-success response to an [`ApiError`], keeping a bit of the body
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(200).collect();
    Err(ApiError::from_status(status.as_u16(), message))
}

#[async_trait]
impl VideoApi for YouTubeClient {
    async fn search(&self, request: &SearchRequest<'_>) -> Result<SearchPage, ApiError> {
        let mut params: Vec<(&str, String)> = vec![
            ("part", "id".to_string()),
            ("q", request.query.to_string()),
            ("type", "video".to_string()),
            ("order", request.order.as_api_str().to_string()),
            ("maxResults", request.page_size.to_string()),
            ("key", self.api_key.clone()),
        ];
        if let Some(token) = request.page_token {
            params.push(("pageToken", token.to_string()));
        }
        if let Some(start) = request.window.start_str() {
            params.push(("publishedAfter", start));
        }
        if let Some(end) = request.window.end_str() {
            params.push(("publishedBefore", end));
        }

        let response = self
            .client
            .get(self.endpoint("search"))
            .query(&params)
            .send()
            .await?;
        let body: SearchResponse = check_status(response).await?.json().await?;

        Ok(SearchPage {
            hits: body
                .items
                .into_iter()
                .map(|item| SearchHit {
                    kind: item.id.kind,
                    video_id: item.id.video_id,
                })
                .collect(),
            continuation: body.next_page_token,
        })
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<serde_json::Value>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("videos"))
            .query(&[
                ("part", DETAIL_PARTS.to_string()),
                ("id", ids.join(",")),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;
        let body: VideoListResponse = check_status(response).await?.json().await?;
        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> ApiConfig {
        ApiConfig {
            base_url: "https://example.com/youtube/v3/".to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = YouTubeClient::new(&create_test_config(), "key").unwrap();
        assert_eq!(
            client.endpoint("search"),
            "https://example.com/youtube/v3/search"
        );
    }
}
