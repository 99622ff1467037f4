//! Result types returned by [`crate::split::split`] and [`crate::split::inspect`].

use crate::pipeline::render::PageImage;
use crate::workspace::WorkspaceLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one split produced.
#[derive(Debug, Clone, Serialize)]
pub struct SplitOutput {
    /// Resolved output tree.
    pub layout: WorkspaceLayout,
    /// Path of the cleaned text file.
    pub text_path: PathBuf,
    /// The cleaned text, exactly as written.
    pub text: String,
    /// Rendered pages in page order.
    pub pages: Vec<PageImage>,
    pub metadata: DocumentMetadata,
    pub stats: SplitStats,
}

/// PDF info-dictionary metadata plus page count and version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters and timings for one split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitStats {
    pub total_pages: usize,
    pub paragraphs: usize,
    /// Byte length of the cleaned text.
    pub text_len: usize,
    pub images_written: usize,
    pub text_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}
