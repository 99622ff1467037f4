//! PDF engine: bind the pdfium shared library and open documents.
//!
//! pdfium is loaded dynamically. The library is searched in this order, and
//! the first candidate that binds wins:
//!
//! 1. [`SplitConfig::pdfium_lib_path`](crate::config::SplitConfig::pdfium_lib_path)
//! 2. `PDFIUM_LIB_PATH`
//! 3. the platform library name in the current directory (`./libpdfium.so`, …)
//! 4. the system library search path
//!
//! Every stage binds its own [`Pdfium`] and opens its own [`PdfDocument`];
//! both are released when the stage returns.

use crate::config::SplitConfig;
use crate::error::PdfSplitError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to a pdfium library following the search order above.
pub fn bind_pdfium(config: &SplitConfig) -> Result<Pdfium, PdfSplitError> {
    let mut failures: Vec<String> = Vec::new();

    for candidate in explicit_candidates(config) {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => {
                warn!("Could not bind pdfium at {}: {:?}", candidate.display(), e);
                failures.push(format!("{}: {:?}", candidate.display(), e));
            }
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local).or_else(|_| Pdfium::bind_to_system_library()) {
        Ok(bindings) => {
            debug!("Bound pdfium from local directory or system library");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            failures.push(format!("system library: {:?}", e));
            Err(PdfSplitError::PdfiumBindingFailed(failures.join("; ")))
        }
    }
}

/// Library paths named explicitly by config or environment, in priority order.
fn explicit_candidates(config: &SplitConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(ref path) = config.pdfium_lib_path {
        candidates.push(path.clone());
    }
    if let Ok(env_path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !env_path.is_empty() {
            candidates.push(PathBuf::from(env_path));
        }
    }
    candidates
}

/// Open a PDF, mapping pdfium load failures to document-open errors.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfSplitError> {
    pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_load_error(pdf_path, password, format!("{:?}", e)))
}

/// pdfium reports password problems only through its error text.
fn map_load_error(pdf_path: &Path, password: Option<&str>, err_str: String) -> PdfSplitError {
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            PdfSplitError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            PdfSplitError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        PdfSplitError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}
