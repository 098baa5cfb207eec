//! State module for tracking crawl outcomes
//!
//! `PageState` records how each dequeued page ended: fetched and expanded,
//! fetched but not HTML, or one of the fetch failure kinds.

mod page_state;

pub use page_state::PageState;
