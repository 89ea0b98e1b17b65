//! Batch conversion of SVG drawings to PNG images.
//!
//! Only the directory itself is scanned, not its subdirectories. A file
//! qualifies when its extension is exactly `svg`; `drawing.SVG` does not.
//! Each PNG is written next to its SVG, which is left in place.

use std::path::{Path, PathBuf};

use crate::error::HarnessError;

/// Extension marking a vector drawing (case-sensitive).
pub const SVG_EXTENSION: &str = "svg";

/// Extension of rendered rasters.
pub const PNG_EXTENSION: &str = "png";

/// Outcome of a successful batch conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// PNG files written, in conversion order.
    pub converted: Vec<PathBuf>,
}

/// `true` if `path` names an SVG drawing.
#[must_use]
pub fn is_svg(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SVG_EXTENSION)
}

/// SVG files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`HarnessError::ReadDir`] if the directory cannot be listed.
pub fn svg_files(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let read_dir_error = |source| HarnessError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        if is_svg(&path) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Render one SVG file to a PNG sibling with the same stem.
///
/// # Errors
///
/// Returns [`HarnessError::SvgRead`], [`HarnessError::Rasterize`] or
/// [`HarnessError::PngWrite`] depending on which step failed.
pub fn convert_svg_file(svg: &Path) -> Result<PathBuf, HarnessError> {
    let data = std::fs::read(svg).map_err(|source| HarnessError::SvgRead {
        path: svg.to_path_buf(),
        source,
    })?;
    let png = vectrace_raster::svg_to_png(&data).map_err(|source| HarnessError::Rasterize {
        path: svg.to_path_buf(),
        source,
    })?;

    let target = svg.with_extension(PNG_EXTENSION);
    std::fs::write(&target, png).map_err(|source| HarnessError::PngWrite {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

/// Convert every SVG directly inside `dir`.
///
/// Every file is attempted even if an earlier one fails; failures are
/// logged as they happen and reported together afterwards.
///
/// # Errors
///
/// Returns [`HarnessError::ReadDir`] if the directory cannot be listed and
/// [`HarnessError::Conversion`] if any file failed.
pub fn convert_svg_directory(dir: &Path) -> Result<ConversionSummary, HarnessError> {
    let files = svg_files(dir)?;
    let total = files.len();
    let mut summary = ConversionSummary::default();
    let mut failed = Vec::new();

    for svg in files {
        match convert_svg_file(&svg) {
            Ok(png) => {
                tracing::debug!(png = %png.display(), "rendered");
                summary.converted.push(png);
            }
            Err(err) => {
                tracing::error!("{err}");
                failed.push(svg);
            }
        }
    }

    if failed.is_empty() {
        tracing::info!("converted {total} SVG file(s) in {}", dir.display());
        Ok(summary)
    } else {
        Err(HarnessError::Conversion { failed, total })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="6" height="4"><rect width="6" height="4" fill="blue"/></svg>"#;

    #[test]
    fn is_svg_is_case_sensitive() {
        assert!(is_svg(Path::new("a.svg")));
        assert!(is_svg(Path::new("dir/x.y.svg")));
        assert!(!is_svg(Path::new("c.SVG")));
        assert!(!is_svg(Path::new("b.txt")));
        assert!(!is_svg(Path::new("svg")));
    }

    #[test]
    fn converts_svg_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.svg"), SQUARE).unwrap();
        std::fs::write(root.join("b.txt"), "keep me").unwrap();
        std::fs::write(root.join("c.SVG"), SQUARE).unwrap();

        let summary = convert_svg_directory(root).unwrap();
        assert_eq!(summary.converted, vec![root.join("a.png")]);

        let png = image::open(root.join("a.png")).unwrap();
        assert_eq!((png.width(), png.height()), (6, 4));
        assert!(root.join("a.svg").exists(), "source SVG must stay in place");
        assert_eq!(std::fs::read_to_string(root.join("b.txt")).unwrap(), "keep me");
        assert!(!root.join("c.png").exists(), "uppercase extension is not converted");
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("deep.svg"), SQUARE).unwrap();
        std::fs::create_dir(dir.path().join("folder.svg")).unwrap();

        let summary = convert_svg_directory(dir.path()).unwrap();
        assert!(summary.converted.is_empty());
        assert!(!nested.join("deep.png").exists());
    }

    #[test]
    fn one_bad_file_does_not_block_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.svg"), SQUARE).unwrap();
        std::fs::write(root.join("b.svg"), "not svg at all").unwrap();
        std::fs::write(root.join("c.svg"), SQUARE).unwrap();

        let err = convert_svg_directory(root).unwrap_err();
        assert!(
            matches!(&err, HarnessError::Conversion { failed, total: 3 } if failed == &[root.join("b.svg")]),
            "unexpected error: {err}",
        );
        assert!(root.join("a.png").exists());
        assert!(root.join("c.png").exists());
        assert!(!root.join("b.png").exists());
    }

    #[test]
    fn missing_directory_is_read_dir_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_svg_directory(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, HarnessError::ReadDir { .. }));
    }

    #[test]
    fn empty_directory_converts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            convert_svg_directory(dir.path()).unwrap(),
            ConversionSummary::default()
        );
    }
}
