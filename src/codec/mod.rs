//! Document decode/encode collaborators
//!
//! Raster formats go through the image crate; multi-page PDFs through the
//! image-XObject codec in `pdf`. A page is always a native-resolution
//! `RgbaImage`, whatever container it came from.

use std::path::Path;

use image::RgbaImage;

use crate::error::{Error, Result};

pub mod pdf;
pub mod raster;

/// One native-resolution document page
pub type Page = RgbaImage;

/// Raster extensions recognized during batch enumeration
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// Kinds of files the engine can decode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Raster,
    Pdf,
}

impl FileKind {
    /// Detect by extension, case-insensitive. `None` means the file is not
    /// ours and batch enumeration skips it.
    pub fn detect(path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if ext == "pdf" {
            Some(FileKind::Pdf)
        } else if RASTER_EXTENSIONS.contains(&ext.as_str()) {
            Some(FileKind::Raster)
        } else {
            None
        }
    }
}

/// Decode a document into its pages, preserving page order.
/// Single raster images decode to a one-page sequence.
pub fn decode(path: &Path) -> Result<Vec<Page>> {
    match FileKind::detect(path) {
        Some(FileKind::Raster) => Ok(vec![raster::decode(path)?]),
        Some(FileKind::Pdf) => pdf::decode(path),
        None => Err(Error::UnsupportedFile(path.to_path_buf())),
    }
}

/// Encode pages to the format implied by the output extension.
/// One raster page saves directly; PDF output takes any page count and
/// preserves order.
pub fn encode(pages: &[Page], path: &Path) -> Result<()> {
    match FileKind::detect(path) {
        Some(FileKind::Raster) if pages.len() == 1 => raster::encode(&pages[0], path),
        Some(FileKind::Pdf) => pdf::encode(pages, path),
        _ => Err(Error::UnsupportedFile(path.to_path_buf())),
    }
}
