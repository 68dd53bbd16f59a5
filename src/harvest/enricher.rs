//! Bulk metadata enrichment

use crate::api::{VideoApi, MAX_DETAIL_BATCH};
use crate::harvest::retry::{execute, RetryPolicy};
use crate::record::VideoRecord;
use crate::HarvestError;
use std::collections::HashSet;

/// Fetches full records for ids in batches of [`MAX_DETAIL_BATCH`]
pub struct MetadataEnricher<'a, A: VideoApi + ?Sized> {
    api: &'a A,
    policy: &'a RetryPolicy,
}

impl<'a, A: VideoApi + ?Sized> MetadataEnricher<'a, A> {
    pub fn new(api: &'a A, policy: &'a RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// Enriches `ids`, appending projected records to `out`
    ///
    /// Records keep the order the API returned them in within each batch;
    /// batches are processed in request order. Records from batches that
    /// completed before a fatal error stay in `out`. Items for ids the batch
    /// did not request, and repeats of an id already emitted, are skipped.
    ///
    /// # Returns
    ///
    /// The number of detail calls made.
    pub async fn enrich(
        &self,
        ids: &[String],
        out: &mut Vec<VideoRecord>,
    ) -> Result<u32, HarvestError> {
        let mut calls = 0;

        for batch in ids.chunks(MAX_DETAIL_BATCH) {
            let items = execute(self.policy, "videos", || self.api.videos(batch)).await?;
            calls += 1;

            let mut pending: HashSet<&str> = batch.iter().map(String::as_str).collect();
            let mut emitted = 0;
            for item in &items {
                let Some(record) = VideoRecord::from_item(item) else {
                    tracing::warn!("Skipping detail item without an id");
                    continue;
                };
                if !pending.remove(record.video_id.as_str()) {
                    tracing::warn!("Skipping unrequested or repeated item {}", record.video_id);
                    continue;
                }
                out.push(record);
                emitted += 1;
            }

            if emitted < batch.len() {
                tracing::debug!(
                    "Detail batch returned {} of {} requested ids",
                    emitted,
                    batch.len()
                );
            }
        }

        Ok(calls)
    }
}
