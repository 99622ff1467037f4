//! Progress-callback trait for page rasterisation events.
//!
//! Inject an [`Arc<dyn SplitProgressCallback>`] via
//! [`crate::config::SplitConfigBuilder::progress_callback`] to be told about
//! each page as the rasteriser writes it. The CLI uses this to drive its
//! progress bar; library users can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfsplit::{SplitConfig, SplitProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl SplitProgressCallback for CountingCallback {
//!     fn on_page_rendered(&self, page_num: usize, total_pages: usize, path: &Path) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {}/{} → {}", page_num, total_pages, path.display());
//!     }
//! }
//!
//! let config = SplitConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { rendered: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it splits a document.
///
/// All methods default to no-ops so callers only override what they need.
/// The pipeline is single-threaded, but the trait is `Send + Sync` so a
/// config holding a callback can still be shared across threads.
pub trait SplitProgressCallback: Send + Sync {
    /// Called once the text file has been written.
    ///
    /// # Arguments
    /// * `paragraphs`: number of text blocks that contributed a paragraph
    /// * `text_len`: byte length of the cleaned text
    fn on_text_extracted(&self, paragraphs: usize, text_len: usize) {
        let _ = (paragraphs, text_len);
    }

    /// Called once before the first page is rendered.
    fn on_render_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's JPEG has been written.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages in the document
    /// * `path`: where the JPEG was written
    fn on_page_rendered(&self, page_num: usize, total_pages: usize, path: &Path) {
        let _ = (page_num, total_pages, path);
    }

    /// Called once after every page has been written.
    fn on_render_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SplitConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;
