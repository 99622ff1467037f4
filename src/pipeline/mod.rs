//! Pipeline stages for splitting a PDF.
//!
//! Each submodule implements exactly one step and can be called on its own.
//! The text and render stages each open the document independently; they
//! share nothing but the input path and the output tree.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ layout ──▶ text ──▶ output/pdf_text.txt
//! input ─────┤   (spans→blocks) (clean)
//! (validate) └─▶ render ─────────────▶ output/pages_as_images/page_<n>.jpg
//!                (pdfium → JPEG)
//!
//! output/graphs/*.csv ──▶ tables (read-only)
//! ```
//!
//! 1. [`input`]: existence, permission and `%PDF` magic checks
//! 2. [`layout`]: rebuild block → line → span structure from text objects
//! 3. [`text`]: paragraphs, normalisation, atomic write
//! 4. [`render`]: one JPEG per page
//! 5. [`tables`]: read back externally produced graph CSVs

pub mod input;
pub mod layout;
pub mod render;
pub mod tables;
pub mod text;
