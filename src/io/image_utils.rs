// Copyright @yucwang 2026

use super::ImageWriteError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

use image::{ ImageBuffer, Rgb };
use std::path::Path;

const DISPLAY_GAMMA: Float = 2.2;

/// Clamps to `[0, 1]` and applies display gamma.
pub fn encode_gamma(v: Float) -> u8 {
    let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    (v.powf(1.0 / DISPLAY_GAMMA) * 255.0 + 0.5) as u8
}

/// Writes an 8-bit image; the format follows the file extension.
pub fn write_ldr_to_file<P: AsRef<Path>>(bitmap: &Bitmap, file_path: P) -> Result<(), ImageWriteError> {
    let file_path = file_path.as_ref();
    log::info!("Writing {}x{} image to {}.", bitmap.width(), bitmap.height(), file_path.display());

    let buffer = ImageBuffer::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        let px = bitmap[(x as usize, y as usize)];
        Rgb([encode_gamma(px[0]), encode_gamma(px[1]), encode_gamma(px[2])])
    });
    buffer.save(file_path)?;
    Ok(())
}
