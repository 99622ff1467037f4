//! Output workspace: the `output/` tree and its read-back accessors.
//!
//! ```text
//! output/
//! ├── pdf_text.txt          cleaned document text
//! ├── graphs/               *.csv tables produced by other tools
//! └── pages_as_images/      page_1.jpg … page_N.jpg
//! ```
//!
//! [`reset_workspace`] is destructive: it recursively deletes the output
//! root before recreating it, so nothing from a previous run can leak into
//! the next one. It is never called implicitly; [`ensure_workspace`] is the
//! non-destructive variant used by [`crate::split::split`].
//! [`check_reset_target`] rejects roots whose removal would take more than
//! previous output with it.

use crate::config::{page_image_name, SplitConfig};
use crate::error::PdfSplitError;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Resolved paths of the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceLayout {
    pub root: PathBuf,
    pub text_path: PathBuf,
    pub graphs_dir: PathBuf,
    pub pages_dir: PathBuf,
}

impl WorkspaceLayout {
    pub fn from_config(config: &SplitConfig) -> Self {
        Self {
            root: config.output_dir.clone(),
            text_path: config.text_path(),
            graphs_dir: config.graphs_dir(),
            pages_dir: config.pages_dir(),
        }
    }

    /// Path of the JPEG for a 1-indexed page number.
    pub fn page_image_path(&self, page_num: usize) -> PathBuf {
        self.pages_dir.join(page_image_name(page_num))
    }
}

/// Wipe the output root (if present) and recreate the empty tree.
///
/// Callers must not point this at a directory holding anything they wish to
/// keep. Failures to delete or create are returned unhandled.
pub fn reset_workspace(config: &SplitConfig) -> Result<WorkspaceLayout, PdfSplitError> {
    let layout = WorkspaceLayout::from_config(config);

    match std::fs::remove_dir_all(&layout.root) {
        Ok(()) => info!("Removed previous output at {}", layout.root.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(PdfSplitError::Workspace {
                path: layout.root,
                source: e,
            })
        }
    }

    create_tree(&layout)?;
    Ok(layout)
}

/// Create the output tree without deleting anything.
pub fn ensure_workspace(config: &SplitConfig) -> Result<WorkspaceLayout, PdfSplitError> {
    let layout = WorkspaceLayout::from_config(config);
    create_tree(&layout)?;
    Ok(layout)
}

fn create_tree(layout: &WorkspaceLayout) -> Result<(), PdfSplitError> {
    for dir in [&layout.root, &layout.graphs_dir, &layout.pages_dir] {
        create_dir(dir)?;
    }
    debug!("Workspace ready at {}", layout.root.display());
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), PdfSplitError> {
    std::fs::create_dir_all(dir).map_err(|e| PdfSplitError::Workspace {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Refuse output roots that must never be wiped.
///
/// Fails with [`PdfSplitError::InvalidConfig`] when the resolved root is a
/// filesystem root, the current directory or one of its ancestors, the home
/// directory or one of its ancestors, or a directory containing `input`.
/// Paths are compared after resolving symlinks, so `-o .` and `-o $PWD`
/// are caught alike.
pub fn check_reset_target(config: &SplitConfig, input: &Path) -> Result<(), PdfSplitError> {
    let cwd = std::env::current_dir().map_err(|e| PdfSplitError::Workspace {
        path: PathBuf::from("."),
        source: e,
    })?;
    let root = resolve_path(&config.output_dir, &cwd);
    let refuse = |reason: String| {
        PdfSplitError::InvalidConfig(format!(
            "refusing to reset output directory '{}': {}",
            config.output_dir.display(),
            reason
        ))
    };

    if root.parent().is_none() {
        return Err(refuse("it is a filesystem root".to_string()));
    }
    if resolve_path(&cwd, &cwd).starts_with(&root) {
        return Err(refuse(
            "it is the current directory or one of its parents".to_string(),
        ));
    }
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        if resolve_path(Path::new(&home), &cwd).starts_with(&root) {
            return Err(refuse("it contains the home directory".to_string()));
        }
    }
    if resolve_path(input, &cwd).starts_with(&root) {
        return Err(refuse(format!(
            "the input '{}' lies inside it",
            input.display()
        )));
    }

    Ok(())
}

/// Absolute, symlink-free form of `path`, even when its tail does not exist.
///
/// `.` and `..` are folded lexically first; the longest existing prefix is
/// then canonicalised and the missing components are appended back.
fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    let mut base = PathBuf::new();
    for component in cwd.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            other => base.push(other.as_os_str()),
        }
    }

    let mut missing = Vec::new();
    while base.canonicalize().is_err() {
        match base.file_name() {
            Some(name) => {
                missing.push(name.to_os_string());
                base.pop();
            }
            None => break,
        }
    }

    let mut resolved = base.canonicalize().unwrap_or(base);
    for name in missing.into_iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Read back the cleaned text written by the text extractor.
///
/// Fails with [`PdfSplitError::TextNotExtracted`] rather than returning an
/// empty string when extraction has not run yet.
pub fn read_text(config: &SplitConfig) -> Result<String, PdfSplitError> {
    let path = config.text_path();
    std::fs::read_to_string(&path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            PdfSplitError::TextNotExtracted { path }
        } else {
            PdfSplitError::Workspace { path, source: e }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> SplitConfig {
        SplitConfig::builder()
            .output_dir(dir.path().join("output"))
            .build()
            .unwrap()
    }

    #[test]
    fn reset_creates_tree() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let layout = reset_workspace(&config).unwrap();

        assert!(layout.root.is_dir());
        assert!(layout.graphs_dir.is_dir());
        assert!(layout.pages_dir.is_dir());
        assert!(!layout.text_path.exists());
    }

    #[test]
    fn reset_removes_stale_artifacts() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let layout = reset_workspace(&config).unwrap();

        std::fs::write(&layout.text_path, "old text").unwrap();
        std::fs::write(layout.page_image_path(7), b"jpeg").unwrap();
        std::fs::write(layout.graphs_dir.join("old.csv"), "a,b\n1,2\n").unwrap();
        std::fs::create_dir(layout.root.join("stray")).unwrap();

        let layout = reset_workspace(&config).unwrap();

        assert!(!layout.text_path.exists());
        assert_eq!(std::fs::read_dir(&layout.pages_dir).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(&layout.graphs_dir).unwrap().count(), 0);
        assert!(!layout.root.join("stray").exists());
    }

    #[test]
    fn reset_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let first = reset_workspace(&config).unwrap();
        let second = reset_workspace(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_keeps_existing_files() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let layout = reset_workspace(&config).unwrap();
        std::fs::write(&layout.text_path, "keep me").unwrap();

        ensure_workspace(&config).unwrap();

        assert_eq!(std::fs::read_to_string(&layout.text_path).unwrap(), "keep me");
    }

    #[test]
    fn reset_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("output");
        std::fs::write(&root, "not a directory").unwrap();
        let config = SplitConfig::builder().output_dir(&root).build().unwrap();

        // remove_dir_all refuses a plain file.
        let err = reset_workspace(&config).unwrap_err();
        assert!(matches!(err, PdfSplitError::Workspace { .. }), "got: {err}");
    }

    #[test]
    fn read_text_before_extraction_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        reset_workspace(&config).unwrap();

        let err = read_text(&config).unwrap_err();
        assert!(matches!(err, PdfSplitError::TextNotExtracted { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn read_text_returns_contents() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let layout = reset_workspace(&config).unwrap();
        std::fs::write(&layout.text_path, "hello world").unwrap();

        assert_eq!(read_text(&config).unwrap(), "hello world");
    }

    #[test]
    fn read_text_after_reset_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let layout = reset_workspace(&config).unwrap();
        std::fs::write(&layout.text_path, "hello world").unwrap();

        reset_workspace(&config).unwrap();

        assert!(read_text(&config).unwrap_err().is_not_found());
    }

    #[test]
    fn reset_target_in_scratch_dir_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let input = tmp.path().join("report.pdf");

        check_reset_target(&config, &input).unwrap();
    }

    #[test]
    fn reset_target_containing_input_is_refused() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let layout = reset_workspace(&config).unwrap();
        let input = layout.root.join("report.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let err = check_reset_target(&config, &input).unwrap_err();
        assert!(matches!(err, PdfSplitError::InvalidConfig(_)), "got: {err}");
        assert!(err.to_string().contains("lies inside it"), "got: {err}");
        assert!(input.exists());
    }

    #[test]
    fn reset_target_reached_through_dot_dot_is_still_refused() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("output");
        std::fs::create_dir_all(root.join("nested")).unwrap();
        let config = SplitConfig::builder()
            .output_dir(root.join("nested").join(".."))
            .build()
            .unwrap();

        let err = check_reset_target(&config, &root.join("deep").join("in.pdf")).unwrap_err();
        assert!(matches!(err, PdfSplitError::InvalidConfig(_)), "got: {err}");
    }

    #[test]
    fn current_dir_and_its_parents_are_refused() {
        let cwd = std::env::current_dir().unwrap();
        let elsewhere = Path::new("/nonexistent-input/report.pdf");

        for dir in [PathBuf::from("."), cwd.clone(), PathBuf::from("..")] {
            let config = SplitConfig::builder().output_dir(&dir).build().unwrap();
            let err = check_reset_target(&config, elsewhere).unwrap_err();
            assert!(matches!(err, PdfSplitError::InvalidConfig(_)), "{}: {err}", dir.display());
        }
    }

    #[test]
    fn filesystem_root_is_refused() {
        let config = SplitConfig::builder().output_dir("/").build().unwrap();
        let err = check_reset_target(&config, Path::new("/tmp/in.pdf")).unwrap_err();
        assert!(err.to_string().contains("filesystem root"), "got: {err}");
    }

    #[test]
    fn home_dir_is_refused() {
        let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) else {
            return;
        };
        let config = SplitConfig::builder().output_dir(&home).build().unwrap();
        let err = check_reset_target(&config, Path::new("/nonexistent-input/report.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfSplitError::InvalidConfig(_)), "got: {err}");
    }

    #[test]
    fn resolve_path_keeps_missing_tail() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().canonicalize().unwrap();

        let resolved = resolve_path(Path::new("a/./b/../c"), tmp.path());

        assert_eq!(resolved, base.join("a").join("c"));
    }
}
