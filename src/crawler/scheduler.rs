//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - The breadth-first queue of URLs to fetch
//! - The per-run visited set that prevents re-enqueueing
//! - Depth limiting
//! - The concurrency limit used when fetching one level

use crate::url::NormalizedUrl;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// The URL to publish in the sitemap
    pub published: Url,

    /// Link hops from the root (root is 0)
    pub depth: u32,
}

/// Set of URLs already enqueued during one crawl
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    /// Marks `url` visited; returns false if it already was
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Scheduler manages the frontier queue for one crawl run
///
/// The scheduler guarantees:
/// - Every URL is enqueued at most once (check and insert are one step)
/// - No URL deeper than `max_depth` is ever enqueued
/// - Levels come out in breadth-first order, in enqueue order within a level
#[derive(Debug)]
pub struct Scheduler {
    /// URLs waiting to be fetched, in discovery order
    frontier: VecDeque<QueuedUrl>,

    /// Every URL ever enqueued
    visited: VisitedSet,

    /// Maximum link hops from the root
    max_depth: u32,

    /// Maximum fetches in flight while draining one level
    max_concurrent: usize,
}

impl Scheduler {
    /// Creates a scheduler seeded with the crawl root at depth 0
    ///
    /// # Arguments
    ///
    /// * `root` - The normalized root URL
    /// * `max_depth` - Maximum link hops from the root
    /// * `max_concurrent` - Fetch concurrency limit (values below 1 become 1)
    pub fn new(root: NormalizedUrl, max_depth: u32, max_concurrent: usize) -> Self {
        let mut scheduler = Self {
            frontier: VecDeque::new(),
            visited: VisitedSet::default(),
            max_depth,
            max_concurrent: max_concurrent.max(1),
        };
        scheduler.enqueue(root, 0);
        scheduler
    }

    /// Enqueues a URL unless it was seen before or is too deep
    ///
    /// Returns true if the URL was added to the frontier.
    pub fn enqueue(&mut self, url: NormalizedUrl, depth: u32) -> bool {
        if depth > self.max_depth || !self.visited.insert(&url.fetch) {
            return false;
        }

        self.frontier.push_back(QueuedUrl {
            url: url.fetch,
            published: url.published,
            depth,
        });
        true
    }

    /// Removes and returns every queued URL at the shallowest queued depth
    ///
    /// Returns `None` once the frontier is empty.
    pub fn next_level(&mut self) -> Option<Vec<QueuedUrl>> {
        let depth = self.frontier.front()?.depth;

        let mut level = Vec::new();
        while self.frontier.front().is_some_and(|queued| queued.depth == depth) {
            if let Some(queued) = self.frontier.pop_front() {
                level.push(queued);
            }
        }

        Some(level)
    }

    /// Returns true if links found at `depth` may be followed
    pub fn can_expand(&self, depth: u32) -> bool {
        depth < self.max_depth
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
