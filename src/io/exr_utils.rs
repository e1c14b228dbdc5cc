/* Copyright 2020 @TwoCookingMice */

use super::ImageWriteError;
use crate::math::bitmap::Bitmap;

use exr::prelude::write_rgb_file;
use std::path::Path;

/// Writes linear RGB radiance as 32-bit float OpenEXR.
pub fn write_exr_to_file<P: AsRef<Path>>(bitmap: &Bitmap, file_path: P) -> Result<(), ImageWriteError> {
    let file_path = file_path.as_ref();
    log::info!("Writing OpenEXR image {}x{} to {}.", bitmap.width(), bitmap.height(), file_path.display());

    write_rgb_file(file_path, bitmap.width(), bitmap.height(), |x, y| {
        let px = bitmap[(x, y)];
        (px[0], px[1], px[2])
    })?;
    Ok(())
}
