//! vectrace-pipeline: in-memory edge-detection preprocessing (sans-IO).
//!
//! Turns a decoded source image into the binary edge map handed to the
//! external vectorization engine:
//! grayscale -> Gaussian blur -> Sobel gradients -> non-maximum
//! suppression -> hysteresis.
//!
//! Reading and writing image files lives in `vectrace-harness`.

mod canny;
pub mod edge;
pub mod grayscale;
pub mod types;

pub use edge::{count_edge_pixels, detect_edges};
pub use types::{CannyThresholds, FilterError, GrayImage, MIN_DIMENSION};

/// Run edge-detection preprocessing on a decoded image.
///
/// # Errors
///
/// Returns [`FilterError::InvalidThreshold`] for unusable thresholds and
/// [`FilterError::TooSmall`] when the image is smaller than
/// [`MIN_DIMENSION`] in either direction.
pub fn preprocess(
    image: &image::DynamicImage,
    thresholds: CannyThresholds,
) -> Result<GrayImage, FilterError> {
    let gray = grayscale::to_grayscale(image);
    edge::detect_edges(&gray, thresholds)
}
