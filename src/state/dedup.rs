//! Run-scoped index of identifiers that have been claimed for enrichment

use std::collections::HashSet;

/// Set of video ids already claimed in this run
///
/// Ids are claimed before enrichment, so an id whose enrichment later fails
/// (or that was dropped by the result budget) is still never retried.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids not yet seen, in input order, and marks them seen
    ///
    /// Duplicates within `ids` are collapsed to their first occurrence.
    pub fn claim_new(&mut self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter(|id| self.seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// Marks ids as seen without returning them (pre-seeding)
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, ids: I) {
        self.seen.extend(ids);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
