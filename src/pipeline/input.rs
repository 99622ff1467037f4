//! Input validation: check a user-supplied path before pdfium sees it.
//!
//! pdfium's own load errors are terse (`FormatError`), so we check existence,
//! read permission and the `%PDF` magic bytes up front and report precise
//! errors instead.

use crate::error::PdfSplitError;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable file starting with `%PDF`.
pub fn validate_pdf_path(path: impl AsRef<Path>) -> Result<PathBuf, PdfSplitError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(PdfSplitError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(PdfSplitError::PermissionDenied { path });
        }
        Err(_) => return Err(PdfSplitError::FileNotFound { path }),
    };

    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) if &magic == b"%PDF" => {}
        Ok(()) => return Err(PdfSplitError::NotAPdf { path, magic }),
        // Shorter than four bytes: cannot be a PDF.
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(PdfSplitError::NotAPdf { path, magic });
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(PdfSplitError::PermissionDenied { path });
        }
        Err(e) => {
            return Err(PdfSplitError::CorruptPdf {
                path,
                detail: e.to_string(),
            })
        }
    }

    debug!("Validated PDF input: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = validate_pdf_path(tmp.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, PdfSplitError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = validate_pdf_path(tmp.path()).unwrap_err();
        assert!(matches!(err, PdfSplitError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fake.pdf");
        std::fs::write(&path, b"PK\x03\x04zipdata").unwrap();

        match validate_pdf_path(&path).unwrap_err() {
            PdfSplitError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn tiny_file_is_not_a_pdf() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tiny.pdf");
        std::fs::write(&path, b"%P").unwrap();
        let err = validate_pdf_path(&path).unwrap_err();
        assert!(matches!(err, PdfSplitError::NotAPdf { .. }));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
        assert_eq!(validate_pdf_path(&path).unwrap(), path);
    }
}
