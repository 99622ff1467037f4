//! Error types for the edgequake-pdfsplit library.
//!
//! Every operation in this crate is a single pass over one document or one
//! directory, so there is exactly one error type: [`PdfSplitError`]. Any
//! failure aborts the enclosing operation and is returned to the immediate
//! caller. Nothing is retried and nothing is downgraded to a warning.
//!
//! Variants carry the offending path or page number plus an actionable hint,
//! so the CLI can print them verbatim.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdfsplit library.
#[derive(Debug, Error)]
pub enum PdfSplitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render could not read a page's text objects.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// pdfium-render could not render a page. The whole pass is aborted.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Workspace / I/O errors ────────────────────────────────────────────
    /// Could not delete or create part of the output directory tree.
    #[error("Workspace error at '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the cleaned text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not encode or save a rendered page as JPEG.
    #[error("Failed to write page image '{path}': {detail}")]
    ImageWriteFailed { path: PathBuf, detail: String },

    /// The cleaned text file does not exist yet.
    ///
    /// Returned by [`crate::workspace::read_text`] when extraction has not
    /// run, or the workspace was reset since.
    #[error("No extracted text at '{path}'\nRun text extraction first.")]
    TextNotExtracted { path: PathBuf },

    /// A CSV file in the graphs directory could not be parsed.
    #[error("Failed to load graph table '{path}': {detail}")]
    GraphTable { path: PathBuf, detail: String },

    // ── Chart interpreter errors ──────────────────────────────────────────
    /// The image handed to the interpreter could not be opened or decoded.
    #[error("Failed to load image '{path}': {detail}")]
    ImageLoadFailed { path: PathBuf, detail: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// VLM API call did not return within `api_timeout_secs`.
    #[error("API call timed out after {secs}s for '{path}'")]
    ApiTimeout { path: PathBuf, secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Pass --pdfium-lib /path/to/libpdfium.\n\
  • Place libpdfium next to the working directory or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfSplitError {
    /// True for the "nothing there yet" conditions: a missing input PDF or
    /// a read-back before text extraction has run.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PdfSplitError::FileNotFound { .. } | PdfSplitError::TextNotExtracted { .. }
        )
    }

    /// True when the document itself could not be opened.
    pub fn is_document_open_error(&self) -> bool {
        matches!(
            self,
            PdfSplitError::FileNotFound { .. }
                | PdfSplitError::PermissionDenied { .. }
                | PdfSplitError::NotAPdf { .. }
                | PdfSplitError::CorruptPdf { .. }
                | PdfSplitError::PasswordRequired { .. }
                | PdfSplitError::WrongPassword { .. }
        )
    }
}
