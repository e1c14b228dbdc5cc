// Copyright @yucwang 2026

pub mod exr_utils;
pub mod image_utils;
pub mod obj_utils;

use crate::math::bitmap::Bitmap;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageWriteError {
    #[error("failed to write exr: {0}")]
    Exr(#[from] exr::error::Error),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Writes `bitmap` in the format named by the file extension: linear
/// radiance for `.exr`, gamma-encoded 8-bit for `.png`, `.jpg` and `.bmp`.
pub fn write_bitmap<P: AsRef<Path>>(bitmap: &Bitmap, path: P) -> Result<(), ImageWriteError> {
    let path = path.as_ref();
    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "exr" => exr_utils::write_exr_to_file(bitmap, path),
        "png" | "jpg" | "jpeg" | "bmp" => image_utils::write_ldr_to_file(bitmap, path),
        _ => Err(ImageWriteError::UnsupportedFormat(path.display().to_string())),
    }
}
