//! # edgequake-pdfsplit
//!
//! Split a PDF into plain text and one JPEG per page, ready for downstream
//! search, summarisation or chart interpretation.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 0. Reset   wipe and recreate output/ (explicit, separate step)
//!  ├─ 1. Input   existence, permission and %PDF magic checks
//!  ├─ 2. Text    text objects → blocks → paragraphs → cleaned string
//!  │             → output/pdf_text.txt
//!  ├─ 3. Render  every page via pdfium → output/pages_as_images/page_<n>.jpg
//!  └─ 4. Read    read_text / load_graph_tables for downstream consumers
//!
//! Optional: interpret  page image → VLM answer ("What does the chart say?")
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfsplit::{read_text, reset_workspace, split, SplitConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SplitConfig::default();
//!     reset_workspace(&config)?;
//!     let output = split("document.pdf", &config)?;
//!     eprintln!("{} pages rendered", output.pages.len());
//!     println!("{}", read_text(&config)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsplit` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-pdfsplit = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Text extraction and rendering bind a pdfium shared library at runtime.
//! See [`engine::bind_pdfium`] for the lookup order.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod interpret;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod split;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSelection, SplitConfig, SplitConfigBuilder};
pub use error::PdfSplitError;
pub use interpret::{
    interpreter_from_config, ChartInterpreter, InterpreterConfig, InterpreterKind,
    VlmChartInterpreter,
};
pub use output::{DocumentMetadata, SplitOutput, SplitStats};
pub use pipeline::render::{render_pages, PageImage};
pub use pipeline::tables::{load_graph_tables, GraphTable};
pub use pipeline::text::{clean_text, extract_text, TextExtraction};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use split::{inspect, split};
pub use workspace::{
    check_reset_target, ensure_workspace, read_text, reset_workspace, WorkspaceLayout,
};
