//! Shared types for the vectrace preprocessing stage.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can hold the edge map
/// without depending on `image` directly.
pub use image::GrayImage;

/// Smallest width or height the edge detector accepts.
///
/// Gradient computation and non-maximum suppression need at least one
/// interior pixel surrounded by a full 3x3 neighbourhood.
pub const MIN_DIMENSION: u32 = 3;

/// The two Canny thresholds as they appear in the configuration file.
///
/// The values are not required to be ordered: the smaller one acts as
/// the hysteresis low threshold and the larger one as the high threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CannyThresholds {
    /// First hysteresis threshold.
    pub threshold1: f32,
    /// Second hysteresis threshold.
    pub threshold2: f32,
}

impl CannyThresholds {
    /// Create a threshold pair.
    #[must_use]
    pub const fn new(threshold1: f32, threshold2: f32) -> Self {
        Self {
            threshold1,
            threshold2,
        }
    }

    /// Check that both thresholds are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidThreshold`] naming the first
    /// offending value.
    pub fn validate(&self) -> Result<(), FilterError> {
        for (name, value) in [("threshold1", self.threshold1), ("threshold2", self.threshold2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(FilterError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }

    /// Returns `(low, high)`.
    #[must_use]
    pub const fn ordered(&self) -> (f32, f32) {
        if self.threshold1 <= self.threshold2 {
            (self.threshold1, self.threshold2)
        } else {
            (self.threshold2, self.threshold1)
        }
    }
}

impl Default for CannyThresholds {
    fn default() -> Self {
        Self::new(50.0, 150.0)
    }
}

/// Errors raised by edge-detection preprocessing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// A threshold is NaN, infinite, or negative.
    #[error("canny {name} must be a finite non-negative number, got {value}")]
    InvalidThreshold {
        /// Configuration key of the rejected threshold.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The image has no interior pixels to run the detector on.
    #[error("image of {width}x{height} is too small for edge detection (minimum {MIN_DIMENSION}x{MIN_DIMENSION})")]
    TooSmall {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
}
