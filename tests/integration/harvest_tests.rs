//! End-to-end harvest tests
//!
//! A full run against a mock API: paginated search, a rate-limited page,
//! bulk detail calls, and the CSV checkpoints written at the end.

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use vidharvest::config::{load_config, Config};
use vidharvest::harvest::harvester_from_config;
use vidharvest::output::{load_checkpoint_ids, ROW_COLUMNS};
use vidharvest::{HarvestError, RunPhase};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config file pointing at the mock server and loads it
fn create_test_config(dir: &Path, base_url: &str, budget: &str) -> Config {
    let config_path = dir.join("harvest.toml");
    let content = format!(
        r#"
[input]
queries-path = "{queries}"

[api]
base-url = "{base_url}"
page-delay-ms = 0
timeout-secs = 5

[search]
order = "date"

[budget]
{budget}

[retry]
max-retries = 2
rate-limit-cap-secs = 0
transient-base-ms = 0

[output]
rows-path = "{rows}"
counts-path = "{counts}"
"#,
        queries = dir.join("queries.txt").display(),
        rows = dir.join("out/videos.csv").display(),
        counts = dir.join("out/counts.csv").display(),
    );
    std::fs::write(&config_path, content).unwrap();
    load_config(&config_path).expect("Failed to load test config")
}

fn search_page(ids: &[&str], next: Option<&str>) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": {"kind": "youtube#video", "videoId": id}}))
        .collect();
    match next {
        Some(token) => json!({"items": items, "nextPageToken": token}),
        None => json!({"items": items}),
    }
}

fn video_item(id: &str) -> Value {
    json!({
        "id": id,
        "snippet": {
            "title": format!("Video {id}"),
            "channelTitle": "Channel",
            "publishedAt": "2021-03-04T05:06:07Z",
            "tags": ["piano", "live"]
        },
        "contentDetails": {"duration": "PT3M10S", "licensedContent": true},
        "statistics": {"viewCount": "1234"}
    })
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().map(|r| r.unwrap()).collect()
}

#[tokio::test]
async fn test_full_run_with_pagination_and_rate_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), "per-query-cap = 10");

    // Second page of "piano", rate limited once before succeeding
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "piano"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "piano"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(&["v3"], None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "piano"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(&["v1", "v2"], Some("p2"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "violin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(&["v2", "v4"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2,v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v1"), video_item("v2"), video_item("v3")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("v4")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let queries = vec!["piano".to_string(), "violin".to_string()];
    let harvester = harvester_from_config(&config, queries, "test-key").unwrap();
    let report = harvester.run().await.expect("Harvest failed");

    assert_eq!(report.phase, RunPhase::ExhaustedQueries);
    assert_eq!(report.total_enriched, 4);
    assert_eq!(report.calls_used, 3);
    assert_eq!(report.detail_calls, 2);

    let rows_path = dir.path().join("out/videos.csv");
    assert_eq!(
        load_checkpoint_ids(&rows_path).unwrap(),
        vec!["v1", "v2", "v3", "v4"]
    );

    let mut rdr = csv::Reader::from_path(&rows_path).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ROW_COLUMNS);

    let rows = read_rows(&rows_path);
    let first = &rows[0];
    assert_eq!(&first[0], "piano");
    assert_eq!(&first[1], "");
    assert_eq!(&first[4], "Video v1");
    assert_eq!(&first[9], "1234");
    assert_eq!(&first[12], "piano|live");
    assert_eq!(&first[19], "true");
    assert_eq!(&first[24], "https://www.youtube.com/watch?v=v1");
    assert_eq!(&rows[3][0], "violin");

    let counts = read_rows(&dir.path().join("out/counts.csv"));
    assert_eq!(counts.len(), 2);
    assert_eq!(&counts[0][3], "3");
    assert_eq!(&counts[0][4], "3");
    assert_eq!(&counts[1][3], "2");
    assert_eq!(&counts[1][4], "1");
}

#[tokio::test]
async fn test_fatal_search_error_aborts_with_partial_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), "per-query-cap = 10");

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(&["g1"], None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("g1")]
        })))
        .mount(&server)
        .await;

    let queries = vec!["good".to_string(), "broken".to_string()];
    let harvester = harvester_from_config(&config, queries, "test-key").unwrap();
    let err = harvester.run().await.unwrap_err();

    match err {
        HarvestError::Aborted { report, source } => {
            assert_eq!(report.phase, RunPhase::Failed);
            assert_eq!(report.rows_written, 1);
            assert!(matches!(
                *source,
                HarvestError::Fatal {
                    operation: "search",
                    attempts: 3,
                    ..
                }
            ));
        }
        other => panic!("expected aborted run, got {other:?}"),
    }

    let ids = load_checkpoint_ids(&dir.path().join("out/videos.csv")).unwrap();
    assert_eq!(ids, vec!["g1"]);
}

#[tokio::test]
async fn test_call_budget_limits_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        &server.uri(),
        "per-query-cap = 100\nmax-search-calls = 2",
    );

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(&["x1"], Some("more"))))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_item("x1")]
        })))
        .mount(&server)
        .await;

    let queries = vec!["a".to_string(), "b".to_string()];
    let harvester = harvester_from_config(&config, queries, "test-key").unwrap();
    let report = harvester.run().await.unwrap();

    assert_eq!(report.phase, RunPhase::StoppedCallBudget);
    assert_eq!(report.calls_used, 2);
    assert_eq!(report.rows_written, 1);
}
