//! Scripted in-memory [`VideoApi`] used by the harvest unit tests

use crate::api::{ApiError, SearchHit, SearchPage, SearchRequest, VideoApi};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct ScriptedApi {
    /// Pages returned for each query, identical for every window
    pages: HashMap<String, Vec<Vec<SearchHit>>>,
    failing_queries: HashSet<String>,
    hanging_queries: HashSet<String>,
    missing_ids: HashSet<String>,
    reverse_batches: bool,
    /// Detail calls that succeed before every later one fails
    videos_ok_limit: Option<u32>,
    /// Extra items appended to every detail response
    stray_items: Vec<Value>,
    pub search_calls: AtomicU32,
    pub video_calls: AtomicU32,
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a query whose search returns the given id pages in order
    pub fn with_query(mut self, query: &str, pages: &[&[&str]]) -> Self {
        let pages = pages
            .iter()
            .map(|page| page.iter().map(|id| SearchHit::video(*id)).collect())
            .collect();
        self.pages.insert(query.to_string(), pages);
        self
    }

    /// Registers a query with raw hits on a single page
    pub fn with_hits(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.pages.insert(query.to_string(), vec![hits]);
        self
    }

    /// Search for this query always fails with a transient error
    pub fn failing(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    /// Search for this query never completes
    pub fn hanging(mut self, query: &str) -> Self {
        self.hanging_queries.insert(query.to_string());
        self
    }

    /// The detail endpoint silently omits this id
    pub fn missing(mut self, id: &str) -> Self {
        self.missing_ids.insert(id.to_string());
        self
    }

    /// The detail endpoint succeeds `n` times, then always fails with a transient error
    pub fn failing_videos_after(mut self, n: u32) -> Self {
        self.videos_ok_limit = Some(n);
        self
    }

    /// Every detail response also carries an item for this id, requested or not
    pub fn with_stray_item(mut self, id: &str) -> Self {
        self.stray_items.push(item(id));
        self
    }

    /// The detail endpoint returns each batch in reverse order
    pub fn reversed(mut self) -> Self {
        self.reverse_batches = true;
        self
    }

    pub fn search_calls(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn video_calls(&self) -> u32 {
        self.video_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoApi for ScriptedApi {
    async fn search(&self, request: &SearchRequest<'_>) -> Result<SearchPage, ApiError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        if self.hanging_queries.contains(request.query) {
            std::future::pending::<()>().await;
        }
        if self.failing_queries.contains(request.query) {
            return Err(ApiError::Transient("connection reset".to_string()));
        }

        let Some(pages) = self.pages.get(request.query) else {
            return Ok(SearchPage::default());
        };

        let index: usize = request
            .page_token
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let hits = pages.get(index).cloned().unwrap_or_default();
        let continuation = (index + 1 < pages.len()).then(|| (index + 1).to_string());

        Ok(SearchPage { hits, continuation })
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<Value>, ApiError> {
        let previous = self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(ids.to_vec());

        if matches!(self.videos_ok_limit, Some(limit) if previous >= limit) {
            return Err(ApiError::Transient("backend error".to_string()));
        }

        let mut items: Vec<Value> = ids
            .iter()
            .filter(|id| !self.missing_ids.contains(*id))
            .map(|id| item(id))
            .collect();
        if self.reverse_batches {
            items.reverse();
        }
        items.extend(self.stray_items.iter().cloned());
        Ok(items)
    }
}

fn item(id: &str) -> Value {
    json!({"id": id, "snippet": {"title": format!("title {id}")}})
}
