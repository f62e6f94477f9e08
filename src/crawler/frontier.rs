//! Frontier and visited set for a single crawl run
//!
//! A URL is marked visited when it is enqueued, not when it is fetched. Every
//! dequeued URL is therefore unique for the run, including under concurrent
//! fetching of a batch.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be fetched, tagged with its link distance from the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// FIFO work queue plus the set of URLs ever enqueued
///
/// Strict FIFO order keeps dequeued depths monotonically non-decreasing: every
/// depth-`d` entry is dequeued before any depth-`d + 1` entry.
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` at `depth` unless it has been seen before
    ///
    /// Returns true if the URL was newly queued.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if !self.visited.insert(visit_key(&url)) {
            return false;
        }

        self.pending.push_back(FrontierEntry { url, depth });
        true
    }

    /// Removes the earliest-queued entry
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        self.pending.pop_front()
    }

    /// Removes up to `limit` entries that share the depth of the front entry
    ///
    /// The batch never mixes depths, so fetching it concurrently keeps the
    /// breadth-first ordering.
    pub fn dequeue_batch(&mut self, limit: usize) -> Vec<FrontierEntry> {
        let Some(depth) = self.pending.front().map(|entry| entry.depth) else {
            return Vec::new();
        };

        let mut batch = Vec::new();
        while batch.len() < limit {
            match self.pending.front() {
                Some(entry) if entry.depth == depth => {
                    if let Some(entry) = self.pending.pop_front() {
                        batch.push(entry);
                    }
                }
                _ => break,
            }
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of entries waiting to be fetched
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Number of distinct URLs ever enqueued
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Key used for de-duplication: the serialized URL without its fragment
fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}
