//! Grayscale conversion of a decoded source image.

use image::{DynamicImage, GrayImage};

/// Convert a decoded image to single-channel luminance.
///
/// Uses the `image` crate's weighted luminance conversion, so green
/// contributes most and blue least. Alpha is discarded.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}
