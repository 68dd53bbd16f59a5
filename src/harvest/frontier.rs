//! Paginated search for one query and window
//!
//! The walker follows continuation tokens until the search runs dry, the
//! per-window cap is reached, or the remaining call budget is spent.

use crate::api::{SearchHit, SearchOrder, SearchRequest, VideoApi};
use crate::harvest::retry::{execute, RetryPolicy};
use crate::window::Window;
use crate::HarvestError;
use std::time::Duration;

/// Why a walk ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalkStop {
    /// The search returned no continuation token
    #[default]
    Exhausted,
    /// The per-window cap was reached
    Cap,
    /// The call budget ran out while more pages remained
    CallBudget,
}

/// Ids collected for one window and the search calls it took
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowHarvest {
    /// Video ids in first-seen order, at most the per-window cap
    pub ids: Vec<String>,

    /// Search calls issued (retries inside one call are not counted)
    pub calls: u32,

    pub stop: WalkStop,
}

/// Walks the search frontier for a query
pub struct FrontierWalker<'a, A: VideoApi + ?Sized> {
    api: &'a A,
    policy: &'a RetryPolicy,
    order: SearchOrder,
    page_size: u32,
    page_delay: Duration,
}

impl<'a, A: VideoApi + ?Sized> FrontierWalker<'a, A> {
    pub fn new(
        api: &'a A,
        policy: &'a RetryPolicy,
        order: SearchOrder,
        page_size: u32,
        page_delay: Duration,
    ) -> Self {
        Self {
            api,
            policy,
            order,
            page_size,
            page_delay,
        }
    }

    /// Collects video ids for `query` within `window`
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search query
    /// * `window` - Publish-time bounds
    /// * `cap` - Maximum ids to return
    /// * `call_budget` - Maximum search calls to issue, `None` for unlimited
    ///
    /// # Returns
    ///
    /// The ids truncated to `cap` and the number of calls made, or the fatal
    /// error of a call that exhausted its retries.
    pub async fn collect(
        &self,
        query: &str,
        window: Window,
        cap: usize,
        call_budget: Option<u32>,
    ) -> Result<WindowHarvest, HarvestError> {
        let mut ids: Vec<String> = Vec::new();
        let mut calls = 0u32;
        let mut token: Option<String> = None;

        let stop = loop {
            if matches!(call_budget, Some(budget) if calls >= budget) {
                tracing::debug!("Call budget spent after {} pages for '{}'", calls, query);
                break WalkStop::CallBudget;
            }
            if calls > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let request = SearchRequest {
                query,
                order: self.order,
                page_size: self.page_size,
                page_token: token.as_deref(),
                window,
            };
            let page = execute(self.policy, "search", || self.api.search(&request)).await?;
            calls += 1;

            ids.extend(
                page.hits
                    .iter()
                    .filter_map(SearchHit::as_video_id)
                    .map(str::to_string),
            );

            token = page.continuation;
            if token.is_none() {
                break WalkStop::Exhausted;
            }
            if ids.len() >= cap {
                break WalkStop::Cap;
            }
        };

        ids.truncate(cap);
        Ok(WindowHarvest { ids, calls, stop })
    }
}
