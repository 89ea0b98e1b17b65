//! Canny edge detection.
//!
//! Built from the `imageproc` blur and Sobel primitives rather than
//! `imageproc::edges::canny`, whose hysteresis pass in 0.26 underflows
//! when it reaches the image border and skips two of the eight
//! neighbours (<https://github.com/image-rs/imageproc/issues/705>).
//! The hysteresis here walks all eight neighbours and never leaves the
//! image bounds.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Gaussian sigma applied before gradient computation.
const SIGMA: f32 = 1.4;

/// Offsets of the eight neighbours of a pixel.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Run Canny edge detection with already-ordered thresholds.
///
/// Returns a binary image: 255 for edge pixels, 0 for background.
/// Images without interior pixels produce an all-black map.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    debug_assert!(low_threshold <= high_threshold);
    let (width, height) = image.dimensions();

    let blurred = gaussian_blur_f32(image, SIGMA);
    let gx = horizontal_sobel(&blurred);
    let gy = vertical_sobel(&blurred);
    let magnitude: Vec<f32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(h, v)| f32::from(h[0]).hypot(f32::from(v[0])))
        .collect();

    let thinned = suppress_non_maxima(&magnitude, &gx, &gy, width, height);
    hysteresis(&thinned, width, height, low_threshold, high_threshold)
}

/// Row-major index of `(x, y)`.
const fn index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Keep only pixels whose gradient magnitude is a local maximum along
/// the gradient direction. Border pixels are always suppressed.
fn suppress_non_maxima(
    magnitude: &[f32],
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
    width: u32,
    height: u32,
) -> Vec<f32> {
    let mut out = vec![0.0; magnitude.len()];
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let dx = f32::from(gx.get_pixel(x, y)[0]);
            let dy = f32::from(gy.get_pixel(x, y)[0]);
            let mut angle = dy.atan2(dx).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }

            let (a, b) = if (22.5..67.5).contains(&angle) {
                ((x + 1, y + 1), (x - 1, y - 1))
            } else if (67.5..112.5).contains(&angle) {
                ((x, y - 1), (x, y + 1))
            } else if (112.5..157.5).contains(&angle) {
                ((x - 1, y + 1), (x + 1, y - 1))
            } else {
                ((x - 1, y), (x + 1, y))
            };

            let i = index(x, y, width);
            let here = magnitude[i];
            if here >= magnitude[index(a.0, a.1, width)] && here >= magnitude[index(b.0, b.1, width)]
            {
                out[i] = here;
            }
        }
    }
    out
}

/// Neighbours of `(x, y)` that lie inside a `width` x `height` image.
fn neighbours(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    NEIGHBOURS.iter().filter_map(move |&(dx, dy)| {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < width && ny < height).then_some((nx, ny))
    })
}

/// Threshold the thinned magnitudes with hysteresis.
///
/// Pixels at or above `high` seed an edge; the edge then grows through
/// connected pixels at or above `low`. Iterative depth-first search.
fn hysteresis(strength: &[f32], width: u32, height: u32, low: f32, high: f32) -> GrayImage {
    let mut out = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if strength[index(x, y, width)] < high || out.get_pixel(x, y)[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma([255]));
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for (nx, ny) in neighbours(cx, cy, width, height) {
                    if strength[index(nx, ny, width)] >= low && out.get_pixel(nx, ny)[0] == 0 {
                        out.put_pixel(nx, ny, Luma([255]));
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
    out
}
