//! Whole-document entry points.
//!
//! [`split`] runs the text extractor and then the rasteriser over one PDF
//! and returns a [`SplitOutput`]. It never wipes anything: call
//! [`crate::workspace::reset_workspace`] first for a clean run, as the CLI
//! does unless `--no-reset` is given.

use crate::config::SplitConfig;
use crate::error::PdfSplitError;
use crate::output::{DocumentMetadata, SplitOutput, SplitStats};
use crate::pipeline::{input, render, text};
use crate::workspace;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Split a PDF into cleaned text and per-page JPEGs.
///
/// # Errors
/// Any failure aborts the split: unreadable or invalid input, pdfium
/// binding problems, a page that fails to render, or an unwritable output
/// tree. Artifacts written before the failure are left on disk.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfsplit::{reset_workspace, split, SplitConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SplitConfig::default();
/// reset_workspace(&config)?;
/// let output = split("report.pdf", &config)?;
/// println!("{} pages, {} bytes of text", output.pages.len(), output.text.len());
/// # Ok(())
/// # }
/// ```
pub fn split(pdf_path: impl AsRef<Path>, config: &SplitConfig) -> Result<SplitOutput, PdfSplitError> {
    let total_start = Instant::now();
    let pdf_path = input::validate_pdf_path(pdf_path)?;
    info!("Starting split: {}", pdf_path.display());

    // ── Step 1: Metadata ─────────────────────────────────────────────────
    let metadata = render::extract_metadata(&pdf_path, config)?;
    info!("PDF has {} pages", metadata.page_count);

    // ── Step 2: Output tree ──────────────────────────────────────────────
    let layout = workspace::ensure_workspace(config)?;

    // ── Step 3: Text ─────────────────────────────────────────────────────
    let text_start = Instant::now();
    let extraction = text::extract_text(&pdf_path, config)?;
    let text_duration_ms = text_start.elapsed().as_millis() as u64;

    // ── Step 4: Page images ──────────────────────────────────────────────
    let render_start = Instant::now();
    let pages = render::render_pages(&pdf_path, config)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let stats = SplitStats {
        total_pages: metadata.page_count,
        paragraphs: extraction.paragraph_count,
        text_len: extraction.text.len(),
        images_written: pages.len(),
        text_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Split complete: {} pages, {} bytes of text, {}ms total",
        stats.total_pages, stats.text_len, stats.total_duration_ms
    );

    Ok(SplitOutput {
        layout,
        text_path: extraction.path,
        text: extraction.text,
        pages,
        metadata,
        stats,
    })
}

/// Read PDF metadata without extracting or rendering anything.
pub fn inspect(
    pdf_path: impl AsRef<Path>,
    config: &SplitConfig,
) -> Result<DocumentMetadata, PdfSplitError> {
    render::extract_metadata(pdf_path, config)
}
