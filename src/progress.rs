//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as pages resolve.
//!
//! # Example
//!
//! ```rust
//! use room_extract::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     records: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, records: usize) {
//!         self.records.fetch_add(records, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { records: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extractor as pages resolve.
///
/// Page events arrive in completion order, which is not necessarily page
/// order. All methods default to no-ops.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once the document is open and its page count is known.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page's records are ready.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in the document
    /// * `records`     — records built from this page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, records: usize) {
        let _ = (page_num, total_pages, records);
    }

    /// Called when a page's text retrieval fails. The extraction aborts.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page resolved successfully. For a streamed
    /// extraction this fires only once the stream has been drained.
    fn on_extraction_complete(&self, total_pages: usize, total_records: usize) {
        let _ = (total_pages, total_records);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
