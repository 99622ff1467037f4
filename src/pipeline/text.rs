//! Text extraction: PDF → paragraphs → one cleaned, flat text file.
//!
//! ## Steps
//!
//! 1. Collect each page's text objects as [`Span`]s, descending into form
//!    XObjects (image, path and shading objects are skipped).
//! 2. Group spans into blocks via [`layout::group_spans`].
//! 3. One paragraph per block; all paragraphs joined with a single space.
//! 4. [`clean_text`]: lowercase, drop newlines, collapse whitespace, trim.
//! 5. Atomically write the result, without a trailing newline.
//!
//! Paragraph boundaries do not survive step 4. Downstream consumers only
//! ever see one flat string.

use crate::config::SplitConfig;
use crate::engine;
use crate::error::PdfSplitError;
use crate::pipeline::input::validate_pdf_path;
use crate::pipeline::layout::{self, Span, Transform};
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of a text extraction pass.
#[derive(Debug, Clone, Serialize)]
pub struct TextExtraction {
    /// Where the cleaned text was written.
    pub path: PathBuf,
    /// The cleaned text, exactly as written.
    pub text: String,
    /// Number of pages walked.
    pub page_count: usize,
    /// Number of text blocks that contributed a paragraph.
    pub paragraph_count: usize,
}

/// Extract, clean and persist the text of `pdf_path`.
///
/// Overwrites [`SplitConfig::text_path`]. The parent directory must exist
/// (see [`crate::workspace::ensure_workspace`]).
pub fn extract_text(
    pdf_path: impl AsRef<Path>,
    config: &SplitConfig,
) -> Result<TextExtraction, PdfSplitError> {
    let pdf_path = validate_pdf_path(pdf_path)?;
    let (paragraphs, page_count) = collect_paragraphs(&pdf_path, config)?;

    let text = clean_text(&paragraphs.join(" "));
    let path = config.text_path();
    write_atomic(&path, &text)?;

    info!(
        "Extracted {} paragraphs from {} pages → {} ({} bytes)",
        paragraphs.len(),
        page_count,
        path.display(),
        text.len()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_text_extracted(paragraphs.len(), text.len());
    }

    Ok(TextExtraction {
        path,
        text,
        page_count,
        paragraph_count: paragraphs.len(),
    })
}

/// Walk every page and return `(paragraphs, page_count)`.
///
/// The document is opened and dropped inside this function, so the handle
/// is released on every return path.
fn collect_paragraphs(
    pdf_path: &Path,
    config: &SplitConfig,
) -> Result<(Vec<String>, usize), PdfSplitError> {
    let pdfium = engine::bind_pdfium(config)?;
    let document = engine::open_document(&pdfium, pdf_path, config.password.as_deref())?;

    let mut paragraphs = Vec::new();
    let mut page_count = 0;

    for (idx, page) in document.pages().iter().enumerate() {
        page_count += 1;
        let spans = page_spans(&page, idx + 1)?;
        let span_count = spans.len();
        let blocks = layout::group_spans(spans);
        debug!(
            "Page {}: {} text spans in {} blocks",
            idx + 1,
            span_count,
            blocks.len()
        );
        paragraphs.extend(
            blocks
                .iter()
                .map(|b| b.paragraph())
                .filter(|p| !p.is_empty()),
        );
    }

    Ok((paragraphs, page_count))
}

/// Text objects of one page as spans, in content-stream order.
///
/// Form XObjects are walked recursively so stamped headers and imposed
/// pages contribute their text. Nested bounds are mapped back into page
/// space through each form's matrix.
fn page_spans(page: &PdfPage, page_num: usize) -> Result<Vec<Span>, PdfSplitError> {
    let mut spans = Vec::new();
    for object in page.objects().iter() {
        push_object_spans(&object, Transform::IDENTITY, page_num, &mut spans)?;
    }
    Ok(spans)
}

fn push_object_spans(
    object: &PdfPageObject,
    to_page: Transform,
    page_num: usize,
    spans: &mut Vec<Span>,
) -> Result<(), PdfSplitError> {
    let object_err = |what: &str, e: PdfiumError| PdfSplitError::TextExtractionFailed {
        page: page_num,
        detail: format!("{what}: {:?}", e),
    };

    if let Some(text_object) = object.as_text_object() {
        let bounds = object
            .bounds()
            .map_err(|e| object_err("text object bounds", e))?;
        let (left, bottom, right, top) = to_page.apply_rect(
            bounds.left().value,
            bounds.bottom().value,
            bounds.right().value,
            bounds.top().value,
        );
        spans.push(Span::new(text_object.text(), left, bottom, right, top));
    } else if let Some(form) = object.as_x_object_form_object() {
        let m = form
            .matrix()
            .map_err(|e| object_err("form matrix", e))?;
        let form_to_page = Transform::new(m.a(), m.b(), m.c(), m.d(), m.e(), m.f()).then(to_page);
        for child in form.iter() {
            push_object_spans(&child, form_to_page, page_num, spans)?;
        }
    }

    Ok(())
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalise extracted text.
///
/// Lowercases, replaces every newline with a space, collapses each run of
/// whitespace into one space and trims both ends. Idempotent; the output
/// never contains `'\n'` or two consecutive spaces.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase().replace('\n', " ");
    RE_WHITESPACE.replace_all(&lowered, " ").trim().to_string()
}

/// Write via a temp file in the same directory, then rename over `path`.
fn write_atomic(path: &Path, contents: &str) -> Result<(), PdfSplitError> {
    let write_err = |e: std::io::Error| PdfSplitError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clean_lowercases_and_collapses() {
        assert_eq!(clean_text("Hello\nWorld "), "hello world");
        assert_eq!(clean_text("  A\t\tB  \r\n C  "), "a b c");
    }

    #[test]
    fn clean_empty_and_blank() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn clean_is_idempotent() {
        let samples = [
            "Quarterly REVENUE\n\n grew  12%",
            "  \u{00A0}Unicode\u{2003}spaces ",
            "ÉCOLE Normale\nSupérieure",
            "",
        ];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn clean_never_leaves_double_spaces_or_newlines() {
        let s = clean_text("a  \n\n  b\n\rc\u{000B}d   e");
        assert!(!s.contains("  "), "got {s:?}");
        assert!(!s.contains('\n'));
        assert_eq!(s, "a b c d e");
    }

    #[test]
    fn joined_paragraphs_match_example() {
        // Page 1 holds one block "Hello\nWorld"; page 2 holds nothing.
        let paragraphs = vec!["Hello World".to_string()];
        let combined = paragraphs.join(" ");
        assert_eq!(clean_text(&combined), "hello world");
    }

    #[test]
    fn empty_paragraphs_do_not_leave_artifacts() {
        let paragraphs = ["Alpha", "", "Beta"];
        assert_eq!(clean_text(&paragraphs.join(" ")), "alpha beta");
    }

    #[test]
    fn write_atomic_overwrites_without_newline() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pdf_text.txt");
        std::fs::write(&path, "stale contents that are longer").unwrap();

        write_atomic(&path, "fresh").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_missing_parent_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("pdf_text.txt");
        let err = write_atomic(&path, "x").unwrap_err();
        assert!(matches!(err, PdfSplitError::OutputWriteFailed { .. }));
    }

    #[test]
    fn extract_text_rejects_non_pdf_before_binding() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.pdf");
        std::fs::write(&path, "just some notes").unwrap();
        let config = SplitConfig::builder()
            .output_dir(tmp.path().join("output"))
            .build()
            .unwrap();

        let err = extract_text(&path, &config).unwrap_err();
        assert!(matches!(err, PdfSplitError::NotAPdf { .. }));
        assert!(!config.text_path().exists());
    }
}
