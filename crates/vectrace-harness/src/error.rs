//! Error types for vectrace runs.
//!
//! Every variant is fatal: the binary reports it once and exits.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use vectrace_pipeline::FilterError;
use vectrace_raster::RasterError;

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration file {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document is not well-formed JSON or lacks a required key.
    #[error("malformed configuration in {origin}: {source}")]
    Parse {
        /// File path or other description of where the document came from.
        origin: String,
        /// Underlying JSON error, including line and column.
        source: serde_json::Error,
    },

    /// A key is present but its value is unusable.
    #[error("invalid configuration value `{key}`: {reason}")]
    Invalid {
        /// Dotted key path.
        key: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The default configuration path could not be derived.
    #[error("cannot locate the running executable: {0}")]
    ExecutableDir(#[source] io::Error),
}

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A workspace directory could not be created.
    #[error("cannot create workspace directory {}: {source}", path.display())]
    Workspace { path: PathBuf, source: io::Error },

    /// The source image is missing or could not be decoded.
    #[error("cannot read input image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Edge detection rejected its input.
    #[error("edge detection failed: {0}")]
    Filter(#[from] FilterError),

    /// An intermediate image or snapshot could not be written.
    #[error("cannot write image {}: {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    /// A subprocess stream log file could not be created.
    #[error("cannot create stream log {}: {source}", path.display())]
    StreamLog { path: PathBuf, source: io::Error },

    /// The external engine could not be started.
    #[error("cannot start `{command}`: {source}")]
    Spawn { command: String, source: io::Error },

    /// The external engine ran but reported failure.
    #[error("`{command}` exited with {status}")]
    EngineFailed { command: String, status: ExitStatus },

    /// A directory could not be listed.
    #[error("cannot list directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    /// An SVG file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    SvgRead { path: PathBuf, source: io::Error },

    /// An SVG file could not be rendered.
    #[error("cannot rasterize {}: {source}", path.display())]
    Rasterize { path: PathBuf, source: RasterError },

    /// A rendered PNG could not be written.
    #[error("cannot write {}: {source}", path.display())]
    PngWrite { path: PathBuf, source: io::Error },

    /// One or more files in a batch conversion failed.
    #[error("{} of {total} SVG files could not be converted", failed.len())]
    Conversion { failed: Vec<PathBuf>, total: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display_names_key() {
        let err = ConfigError::Invalid {
            key: "name",
            reason: "must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration value `name`: must not be empty"
        );
    }

    #[test]
    fn config_error_is_transparent_in_harness_error() {
        let inner = ConfigError::Invalid {
            key: "input",
            reason: "x".to_string(),
        };
        let expected = inner.to_string();
        let err = HarnessError::from(inner);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn conversion_display_counts_failures() {
        let err = HarnessError::Conversion {
            failed: vec![PathBuf::from("a.svg"), PathBuf::from("b.svg")],
            total: 5,
        };
        assert_eq!(err.to_string(), "2 of 5 SVG files could not be converted");
    }

    #[test]
    fn workspace_display_includes_path() {
        let err = HarnessError::Workspace {
            path: PathBuf::from("/nope/logs"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/logs"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }
}
