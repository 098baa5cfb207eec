//! Crawl statistics
//!
//! This module provides the counters collected while a crawl runs and
//! functions for logging and displaying them afterwards.

use crate::state::PageState;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of pages dequeued and fetched (or attempted)
    pub total_pages: u64,

    /// Count of pages by state
    pub pages_by_state: HashMap<PageState, u64>,

    /// Total number of links extracted from processed pages
    pub links_discovered: u64,

    /// Links skipped because they point to another origin
    pub external_links_skipped: u64,

    /// Links skipped because their URL was already enqueued
    pub duplicate_links_skipped: u64,

    /// Links skipped because they could not be normalized
    pub invalid_links_skipped: u64,

    /// Deepest level at which a page was fetched
    pub max_depth_reached: u32,
}

impl CrawlStatistics {
    /// Records the outcome of one page
    pub fn record_page(&mut self, state: PageState, depth: u32) {
        self.total_pages += 1;
        *self.pages_by_state.entry(state).or_insert(0) += 1;
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }

    /// Number of pages that ended in the given state
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of pages whose fetch failed
    pub fn failed_pages(&self) -> u64 {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Emits a one-line summary through `tracing`
pub fn log_statistics(stats: &CrawlStatistics) {
    tracing::info!(
        pages = stats.total_pages,
        failed = stats.failed_pages(),
        links = stats.links_discovered,
        external = stats.external_links_skipped,
        depth = stats.max_depth_reached,
        "Crawl statistics"
    );
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!("  Deepest level reached: {}", stats.max_depth_reached);
    println!("  Links found: {}", stats.links_discovered);
    println!("  External links skipped: {}", stats.external_links_skipped);
    println!("  Duplicate links skipped: {}", stats.duplicate_links_skipped);
    println!("  Invalid links skipped: {}", stats.invalid_links_skipped);
    println!();

    println!("Pages by State:");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (state, count) in state_counts {
        let percentage = if stats.total_pages > 0 {
            (*count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    let processed = stats.count(PageState::Processed) + stats.count(PageState::ContentMismatch);
    let success_rate = if stats.total_pages > 0 {
        (processed as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully fetched)",
        success_rate, processed, stats.total_pages
    );
}
