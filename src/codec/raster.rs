//! Raster page decode/encode via the image crate

use std::path::Path;

use image::DynamicImage;

use super::Page;
use crate::error::{Error, Result};

/// Decode a single raster file into one native-resolution page
pub fn decode(path: &Path) -> Result<Page> {
    let img = image::open(path).map_err(|err| Error::decode(path, err))?;
    Ok(img.to_rgba8())
}

/// Save a page in the format implied by the extension.
/// JPEG has no alpha channel, so the page is flattened to RGB first.
pub fn encode(page: &Page, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let saved = match ext.as_str() {
        "jpg" | "jpeg" => DynamicImage::ImageRgba8(page.clone()).to_rgb8().save(path),
        _ => page.save(path),
    };
    saved.map_err(|err| Error::encode(path, err))
}
