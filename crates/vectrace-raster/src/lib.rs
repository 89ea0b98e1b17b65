//! vectrace-raster: render SVG drawings to raster images (sans-IO).
//!
//! Parses SVG bytes with `usvg`, renders them with `resvg` into a
//! `tiny-skia` pixmap and hands back an `image::RgbaImage` or encoded
//! PNG bytes. Locating and writing files lives in `vectrace-harness`.

pub mod svg;

pub use svg::{RasterError, encode_png, render_svg, svg_to_png};
