//! Canny edge detection with validated thresholds.
//!
//! Returns a binary image where white pixels (255) are edges and
//! black pixels (0) are background.

use image::GrayImage;

use crate::canny;
use crate::types::{CannyThresholds, FilterError, MIN_DIMENSION};

/// Minimum effective Canny threshold.
///
/// A threshold of zero marks every pixel with any gradient as an edge,
/// producing an edge map far too dense for the vectorization engine.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges using the Canny algorithm.
///
/// The smaller threshold is the hysteresis low threshold, the larger one
/// the high threshold. Both are raised to at least [`MIN_THRESHOLD`].
///
/// # Errors
///
/// Returns [`FilterError::InvalidThreshold`] if a threshold is not a
/// finite non-negative number, and [`FilterError::TooSmall`] if either
/// image dimension is below [`MIN_DIMENSION`].
pub fn detect_edges(
    image: &GrayImage,
    thresholds: CannyThresholds,
) -> Result<GrayImage, FilterError> {
    thresholds.validate()?;

    let (width, height) = image.dimensions();
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(FilterError::TooSmall { width, height });
    }

    let (low, high) = thresholds.ordered();
    let high = high.max(MIN_THRESHOLD);
    let low = low.max(MIN_THRESHOLD).min(high);
    Ok(canny::canny(image, low, high))
}

/// Count edge pixels (value == 255) in a binary edge map.
#[must_use]
pub fn count_edge_pixels(edges: &GrayImage) -> u64 {
    edges
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 20x20 image with a sharp vertical boundary at x = 10.
    fn sharp_edge_image() -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _y| {
            if x < 10 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        })
    }

    #[test]
    fn blank_image_produces_no_edges() {
        let img = GrayImage::from_fn(20, 20, |_, _| image::Luma([128]));
        let edges = detect_edges(&img, CannyThresholds::default()).unwrap();
        assert_eq!(edges.dimensions(), (20, 20));
        assert_eq!(count_edge_pixels(&edges), 0, "expected no edges in uniform image");
    }

    #[test]
    fn sharp_boundary_produces_edges() {
        let edges = detect_edges(&sharp_edge_image(), CannyThresholds::default()).unwrap();
        assert!(count_edge_pixels(&edges) > 0);
    }

    #[test]
    fn swapped_thresholds_match_ordered_thresholds() {
        let img = sharp_edge_image();
        let a = detect_edges(&img, CannyThresholds::new(30.0, 90.0)).unwrap();
        let b = detect_edges(&img, CannyThresholds::new(90.0, 30.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_thresholds_are_clamped() {
        // Clamping keeps a flat image edge-free even with zero thresholds.
        let img = GrayImage::from_pixel(16, 16, image::Luma([90]));
        let edges = detect_edges(&img, CannyThresholds::new(0.0, 0.0)).unwrap();
        assert_eq!(count_edge_pixels(&edges), 0);
    }

    #[test]
    fn rejects_too_small_image() {
        let img = GrayImage::new(2, 40);
        let err = detect_edges(&img, CannyThresholds::default()).unwrap_err();
        assert_eq!(
            err,
            FilterError::TooSmall {
                width: 2,
                height: 40
            }
        );
    }

    #[test]
    fn rejects_invalid_threshold() {
        let err = detect_edges(&sharp_edge_image(), CannyThresholds::new(1.0, f32::INFINITY))
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidThreshold { .. }));
    }

    #[test]
    fn count_edge_pixels_works() {
        let mut img = GrayImage::new(10, 10);
        for i in 0..5 {
            img.put_pixel(i, 0, image::Luma([255]));
        }
        img.put_pixel(9, 9, image::Luma([128]));
        assert_eq!(count_edge_pixels(&img), 5);
    }
}
