//! HTTP client tests against a mock video API

use chrono::NaiveDate;
use serde_json::json;
use vidharvest::api::{ApiError, SearchOrder, SearchRequest, VideoApi, YouTubeClient};
use vidharvest::config::ApiConfig;
use vidharvest::window::{start_of_day, Window};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> YouTubeClient {
    let config = ApiConfig {
        base_url: format!("{}/youtube/v3", server.uri()),
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    YouTubeClient::new(&config, "test-key").expect("Failed to build client")
}

fn request<'a>(query: &'a str, token: Option<&'a str>, window: Window) -> SearchRequest<'a> {
    SearchRequest {
        query,
        order: SearchOrder::ViewCount,
        page_size: 50,
        page_token: token,
        window,
    }
}

#[tokio::test]
async fn test_search_sends_expected_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("part", "id"))
        .and(query_param("q", "bach cello suite"))
        .and(query_param("type", "video"))
        .and(query_param("order", "viewCount"))
        .and(query_param("maxResults", "50"))
        .and(query_param("key", "test-key"))
        .and(query_param("pageToken", "CAUQAA"))
        .and(query_param("publishedAfter", "2020-01-01T00:00:00Z"))
        .and(query_param("publishedBefore", "2020-02-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC1"}},
                {"id": {"kind": "youtube#video", "videoId": "def"}}
            ],
            "nextPageToken": "CAoQAA"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let window = Window::new(
        Some(start_of_day(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())),
        Some(start_of_day(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap())),
    );
    let page = client_for(&server)
        .search(&request("bach cello suite", Some("CAUQAA"), window))
        .await
        .expect("search failed");

    let ids: Vec<&str> = page.hits.iter().filter_map(|h| h.as_video_id()).collect();
    assert_eq!(ids, vec!["abc", "def"]);
    assert_eq!(page.hits.len(), 3);
    assert_eq!(page.continuation.as_deref(), Some("CAoQAA"));
}

#[tokio::test]
async fn test_search_last_page_has_no_continuation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let page = client_for(&server)
        .search(&request("nothing", None, Window::unbounded()))
        .await
        .expect("search failed");

    assert!(page.hits.is_empty());
    assert!(page.continuation.is_none());

    let received = server.received_requests().await.unwrap();
    let query = received[0].url.query().unwrap_or_default();
    assert!(!query.contains("pageToken"));
    assert!(!query.contains("publishedAfter"));
}

#[tokio::test]
async fn test_quota_errors_are_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"error":"quotaExceeded"}"#))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search(&request("q", None, Window::unbounded()))
        .await
        .unwrap_err();

    match err {
        ApiError::RateLimited { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("quotaExceeded"));
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_errors_are_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .videos(&["abc".to_string()])
        .await
        .unwrap_err();

    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn test_undecodable_body_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search(&request("q", None, Window::unbounded()))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transient(_)));
}

#[tokio::test]
async fn test_videos_joins_ids_and_returns_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("part", "snippet,contentDetails,statistics"))
        .and(query_param("id", "abc,def"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "def", "snippet": {"title": "Second"}},
                {"id": "abc", "snippet": {"title": "First"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = client_for(&server)
        .videos(&["abc".to_string(), "def".to_string()])
        .await
        .expect("videos failed");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "def");
}
