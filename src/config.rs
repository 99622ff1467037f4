//! Configuration types for PDF splitting.
//!
//! Everything the pipeline needs to know lives in [`SplitConfig`], built via
//! its [`SplitConfigBuilder`]. Constructing a config never touches the file
//! system: wiping the output tree is the separate, explicit step
//! [`crate::workspace::reset_workspace`].

use crate::error::PdfSplitError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Default name of the cleaned text file inside the output root.
pub const DEFAULT_TEXT_FILE_NAME: &str = "pdf_text.txt";
/// Default name of the graph CSV directory inside the output root.
pub const DEFAULT_GRAPHS_DIR_NAME: &str = "graphs";
/// Default name of the page image directory inside the output root.
pub const DEFAULT_PAGES_DIR_NAME: &str = "pages_as_images";

/// Configuration for splitting a PDF into text and page images.
///
/// Built via [`SplitConfig::builder()`] or using [`SplitConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdfsplit::SplitConfig;
///
/// let config = SplitConfig::builder()
///     .output_dir("/tmp/report-split")
///     .render_scale(2.0)
///     .build()
///     .unwrap();
/// assert!(config.pages_dir().ends_with("pages_as_images"));
/// ```
#[derive(Clone)]
pub struct SplitConfig {
    /// Root of the output tree. Default: `output`.
    pub output_dir: PathBuf,

    /// File name of the cleaned text artifact. Default: `pdf_text.txt`.
    pub text_file_name: String,

    /// Directory name for externally produced graph CSVs. Default: `graphs`.
    pub graphs_dir_name: String,

    /// Directory name for rendered pages. Default: `pages_as_images`.
    pub pages_dir_name: String,

    /// Page scale factor used when rasterising. Range: 0.25–8.0. Default: 1.0.
    ///
    /// 1.0 renders one pixel per PDF point (72 DPI), the renderer's natural
    /// pixmap size.
    pub render_scale: f32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit path to a pdfium shared library. Takes precedence over
    /// `PDFIUM_LIB_PATH`.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Optional per-page rendering events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            text_file_name: DEFAULT_TEXT_FILE_NAME.to_string(),
            graphs_dir_name: DEFAULT_GRAPHS_DIR_NAME.to_string(),
            pages_dir_name: DEFAULT_PAGES_DIR_NAME.to_string(),
            render_scale: 1.0,
            password: None,
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("output_dir", &self.output_dir)
            .field("text_file_name", &self.text_file_name)
            .field("graphs_dir_name", &self.graphs_dir_name)
            .field("pages_dir_name", &self.pages_dir_name)
            .field("render_scale", &self.render_scale)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SplitProgressCallback>"),
            )
            .finish()
    }
}

impl SplitConfig {
    /// Create a new builder for `SplitConfig`.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }

    /// Path of the cleaned text file.
    pub fn text_path(&self) -> PathBuf {
        self.output_dir.join(&self.text_file_name)
    }

    /// Directory holding graph CSVs.
    pub fn graphs_dir(&self) -> PathBuf {
        self.output_dir.join(&self.graphs_dir_name)
    }

    /// Directory holding rendered page images.
    pub fn pages_dir(&self) -> PathBuf {
        self.output_dir.join(&self.pages_dir_name)
    }
}

/// File name of the JPEG for a 1-indexed page number: `page_<n>.jpg`.
pub fn page_image_name(page_num: usize) -> String {
    format!("page_{}.jpg", page_num)
}

/// Builder for [`SplitConfig`].
#[derive(Debug)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn text_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.text_file_name = name.into();
        self
    }

    pub fn graphs_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.graphs_dir_name = name.into();
        self
    }

    pub fn pages_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.pages_dir_name = name.into();
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = if scale.is_finite() {
            scale.clamp(0.25, 8.0)
        } else {
            scale
        };
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.pdfium_lib_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, PdfSplitError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(PdfSplitError::InvalidConfig(
                "output directory must not be empty".into(),
            ));
        }
        for (what, name) in [
            ("text file name", &c.text_file_name),
            ("graphs directory name", &c.graphs_dir_name),
            ("pages directory name", &c.pages_dir_name),
        ] {
            validate_component(what, name)?;
        }
        if c.graphs_dir_name == c.pages_dir_name {
            return Err(PdfSplitError::InvalidConfig(format!(
                "graphs and pages directories must differ, both are '{}'",
                c.pages_dir_name
            )));
        }
        if !c.render_scale.is_finite() || c.render_scale <= 0.0 {
            return Err(PdfSplitError::InvalidConfig(format!(
                "render scale must be a positive number, got {}",
                c.render_scale
            )));
        }
        Ok(self.config)
    }
}

fn validate_component(what: &str, name: &str) -> Result<(), PdfSplitError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(PdfSplitError::InvalidConfig(format!(
            "{what} must be a plain name, got '{name}'"
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(PdfSplitError::InvalidConfig(format!(
            "{what} must not contain path separators, got '{name}'"
        )));
    }
    Ok(())
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which rendered pages to hand to the chart interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 1-indexed
    /// page numbers that exist in a document of `total_pages` pages.
    pub fn to_page_numbers(&self, total_pages: usize) -> Vec<usize> {
        let mut pages: Vec<usize> = match self {
            PageSelection::All => (1..=total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![*p]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1);
                let e = (*end).min(total_pages);
                (s..=e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .copied()
                .filter(|&p| p >= 1 && p <= total_pages)
                .collect(),
        };
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}
