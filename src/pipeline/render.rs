//! Page rasterisation: render every page to `page_<n>.jpg` via pdfium.
//!
//! The rasteriser opens the document on its own, independent of the text
//! extractor. Pages are rendered in order at `render_scale` × the page's
//! size in points, converted to RGB8 (JPEG has no alpha channel) and saved
//! with the `image` crate's default JPEG encoder.
//!
//! There is no skip-and-continue policy: the first page that fails to
//! render or save aborts the pass. Files written before the failure are left
//! as they are.

use crate::config::SplitConfig;
use crate::engine;
use crate::error::PdfSplitError;
use crate::output::DocumentMetadata;
use crate::pipeline::input::validate_pdf_path;
use crate::workspace::WorkspaceLayout;
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One rendered page on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page_num: usize,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Render every page of `pdf_path` into [`SplitConfig::pages_dir`].
///
/// # Returns
/// One [`PageImage`] per page, in page order. The count always equals the
/// document's page count.
pub fn render_pages(
    pdf_path: impl AsRef<Path>,
    config: &SplitConfig,
) -> Result<Vec<PageImage>, PdfSplitError> {
    let pdf_path = validate_pdf_path(pdf_path)?;
    let layout = WorkspaceLayout::from_config(config);

    let pdfium = engine::bind_pdfium(config)?;
    let document = engine::open_document(&pdfium, &pdf_path, config.password.as_deref())?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start(total_pages);
    }

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.render_scale);
    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            PdfSplitError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;
        let image = bitmap.as_image();

        let path = layout.page_image_path(page_num);
        let (width, height) = save_jpeg(&image, &path)?;
        debug!(
            "Rendered page {} → {}x{} px → {}",
            page_num,
            width,
            height,
            path.display()
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_rendered(page_num, total_pages, &path);
        }

        results.push(PageImage {
            page_num,
            path,
            width,
            height,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(total_pages);
    }
    info!(
        "Wrote {} page images to {}",
        results.len(),
        layout.pages_dir.display()
    );

    Ok(results)
}

/// Encode `image` as JPEG at `path`, returning its dimensions.
fn save_jpeg(image: &DynamicImage, path: &Path) -> Result<(u32, u32), PdfSplitError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.save_with_format(path, image::ImageFormat::Jpeg)
        .map_err(|e| PdfSplitError::ImageWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    Ok((rgb.width(), rgb.height()))
}

/// Extract document metadata without rendering or extracting anything.
pub fn extract_metadata(
    pdf_path: impl AsRef<Path>,
    config: &SplitConfig,
) -> Result<DocumentMetadata, PdfSplitError> {
    let pdf_path = validate_pdf_path(pdf_path)?;
    let pdfium = engine::bind_pdfium(config)?;
    let document = engine::open_document(&pdfium, &pdf_path, config.password.as_deref())?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn save_jpeg_drops_alpha() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page_1.jpg");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 128])));

        let (w, h) = save_jpeg(&img, &path).expect("RGBA input must encode");

        assert_eq!((w, h), (8, 6));
        let decoded = image::open(&path).expect("valid JPEG");
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn save_jpeg_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("page_1.jpg");
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));

        let err = save_jpeg(&img, &path).unwrap_err();
        assert!(matches!(err, PdfSplitError::ImageWriteFailed { .. }));
    }

    #[test]
    fn render_pages_rejects_missing_input() {
        let tmp = TempDir::new().unwrap();
        let config = SplitConfig::builder()
            .output_dir(tmp.path().join("output"))
            .build()
            .unwrap();
        let err = render_pages(tmp.path().join("absent.pdf"), &config).unwrap_err();
        assert!(err.is_not_found());
    }
}
