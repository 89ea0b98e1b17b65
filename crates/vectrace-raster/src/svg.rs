//! SVG rasterization.

use image::{Rgba, RgbaImage};
use tiny_skia::{Pixmap, Transform};

/// Errors that can occur while turning an SVG document into a raster.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// The document is not valid SVG.
    #[error("failed to parse SVG: {0}")]
    Parse(#[from] usvg::Error),

    /// The canvas is larger than a pixmap can hold.
    #[error("SVG canvas {width}x{height} exceeds the maximum pixmap size")]
    TooLarge {
        /// Declared canvas width.
        width: f32,
        /// Declared canvas height.
        height: f32,
    },

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render SVG bytes at their intrinsic size.
///
/// The canvas starts fully transparent; the drawing is composited on
/// top of it.
///
/// # Errors
///
/// Returns [`RasterError::Parse`] if `data` is not SVG and
/// [`RasterError::TooLarge`] if the canvas cannot be allocated.
pub fn render_svg(data: &[u8]) -> Result<RgbaImage, RasterError> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())?;

    let size = tree.size();
    let too_large = || RasterError::TooLarge {
        width: size.width(),
        height: size.height(),
    };
    let int_size = size.to_int_size();
    let mut pixmap = Pixmap::new(int_size.width(), int_size.height()).ok_or_else(too_large)?;

    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap_to_rgba(&pixmap))
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`RasterError::Encode`] if the PNG encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Render SVG bytes and encode the result as PNG.
///
/// # Errors
///
/// Propagates [`render_svg`] and [`encode_png`] failures.
pub fn svg_to_png(data: &[u8]) -> Result<Vec<u8>, RasterError> {
    encode_png(&render_svg(data)?)
}

/// Convert a pixmap (premultiplied RGBA) to an `RgbaImage` (straight RGBA).
#[allow(clippy::cast_possible_truncation)]
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let data = pixmap.data();
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (i, pixel) in img.pixels_mut().enumerate() {
        let off = i * 4;
        let a = data[off + 3];
        if a == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        } else {
            // channel = premultiplied * 255 / alpha
            let unmul = |c: u8| (u16::from(c) * 255 / u16::from(a)) as u8;
            *pixel = Rgba([unmul(data[off]), unmul(data[off + 1]), unmul(data[off + 2]), a]);
        }
    }
    img
}
