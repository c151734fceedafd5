//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgress>`] via
//! [`crate::config::ExtractionConfigBuilder::progress`] to receive events as
//! the pipeline works through each page.
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a job-status record in a database, or a
//! terminal progress bar without the library knowing anything about how the
//! host application communicates. The trait is `Send + Sync` because the
//! pipeline runs on a blocking worker thread, not the caller's task.

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed strictly in ascending order, so
/// events for one document never arrive out of order.
pub trait ExtractionProgress: Send + Sync {
    /// Called once after the document is opened, before any page work.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page has been extracted (whatever its status).
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `text_len`    — byte length of the extracted text
    fn on_page_extracted(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called when a page hard-faults and is recorded as an ERROR placeholder.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: String) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after all pages have been attempted.
    ///
    /// `faulted_count` is the number of ERROR-placeholder pages.
    fn on_extraction_complete(&self, total_pages: usize, faulted_count: usize) {
        let _ = (total_pages, faulted_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ExtractionProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressHandle = Arc<dyn ExtractionProgress>;
