//! Reading and writing image artifacts on disk.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, ImageReader};

use crate::error::HarnessError;

/// Decode the image at `path`.
///
/// The format is sniffed from the file contents; the extension only
/// breaks ties, so `scan.jpg` holding PNG data and a bare `photo` both load.
///
/// # Errors
///
/// Returns [`HarnessError::ImageLoad`] if the file is missing, unreadable,
/// or not a supported image format.
pub fn read_image(path: &Path) -> Result<DynamicImage, HarnessError> {
    let decode = || -> image::ImageResult<DynamicImage> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    };
    decode().map_err(|source| HarnessError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a single-channel image as JPEG.
///
/// # Errors
///
/// Returns [`HarnessError::ImageWrite`] if encoding or writing fails.
pub fn write_gray_jpeg(image: &GrayImage, path: &Path) -> Result<(), HarnessError> {
    image
        .save_with_format(path, ImageFormat::Jpeg)
        .map_err(|source| write_error(path, source))
}

/// Write any decoded image as JPEG.
///
/// JPEG has no alpha channel, so color images are flattened to RGB first.
///
/// # Errors
///
/// Returns [`HarnessError::ImageWrite`] if encoding or writing fails.
pub fn write_jpeg(image: &DynamicImage, path: &Path) -> Result<(), HarnessError> {
    let result = match image {
        DynamicImage::ImageLuma8(gray) => gray.save_with_format(path, ImageFormat::Jpeg),
        other => other.to_rgb8().save_with_format(path, ImageFormat::Jpeg),
    };
    result.map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: image::ImageError) -> HarnessError {
    HarnessError::ImageWrite {
        path: path.to_path_buf(),
        source,
    }
}
