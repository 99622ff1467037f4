//! Image encoding: image file on disk → base64 PNG wrapped in `ImageData`.
//!
//! Page images are stored as JPEG, but they are re-encoded as PNG before
//! upload so a second lossy pass never touches axis labels and legends.

use crate::error::PdfSplitError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Open `path` and encode it for a VLM request.
pub fn load_image_data(path: &Path) -> Result<ImageData, PdfSplitError> {
    let load_err = |detail: String| PdfSplitError::ImageLoadFailed {
        path: path.to_path_buf(),
        detail,
    };

    let img = image::open(path).map_err(|e| load_err(e.to_string()))?;
    encode_image(&img).map_err(|e| load_err(format!("PNG encoding failed: {e}")))
}

/// Encode a decoded image as a base64 PNG ready for the VLM API.
///
/// `detail: "high"` keeps the provider from downscaling to a single
/// overview tile, which loses tick labels.
pub fn encode_image(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} image → {} bytes base64",
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
