//! Run configuration, loaded once from `config.json`.
//!
//! The document is read a single time at process start and the resulting
//! [`Config`] is only ever borrowed afterwards. Unknown keys are ignored.
//! Missing required keys fail the load instead of surfacing later.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vectrace_pipeline::CannyThresholds;

use crate::error::ConfigError;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Source image handed to the preprocessing stages and, as the
    /// origin, to the external engine.
    pub input: PathBuf,

    /// Short identifier used to build output file names.
    pub name: String,

    /// Base directory for per-run log directories.
    pub log_dir: PathBuf,

    /// Directory for intermediate artifacts handed to the engine.
    pub inter_dir: PathBuf,

    /// Output directory.
    pub out_dir: PathBuf,

    /// Run-wide toggles.
    #[serde(default)]
    pub options: Options,

    /// Preprocessing settings.
    pub options_pre: PreOptions,

    /// External vectorization engine invocation.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Run-wide toggles (`options`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Emit elapsed-time log lines per stage and for the whole run.
    pub timer: bool,
    /// Capture the engine's standard output to `log_<name>.stdout`.
    pub redirect_stdout: bool,
    /// Capture the engine's standard error to `log_<name>.stderr`.
    pub redirect_stderr: bool,
}

/// Preprocessing settings (`options_pre`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreOptions {
    /// Persist intermediate images to the run's log directory.
    #[serde(default)]
    pub log_pictures: bool,

    /// Emit start/end of stage log lines.
    #[serde(default)]
    pub log_text: bool,

    /// Canny thresholds.
    pub canny: CannyThresholds,
}

/// How to invoke the external vectorization engine.
///
/// The final command line is
/// `program args.. --origin .. --input .. --intermediate .. --log-directory .. flags..`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable to spawn.
    pub program: String,
    /// Arguments placed before the path arguments.
    pub args: Vec<String>,
    /// Behavior toggles appended after the path arguments, forwarded as-is.
    pub flags: Vec<String>,
    /// Treat a non-zero exit status as a fatal error.
    pub check_status: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["run".into(), "--release".into(), "--".into()],
            flags: vec!["-i".into(), "-t".into(), "-T".into()],
            check_status: true,
        }
    }
}

impl Config {
    /// File name looked up next to the running executable.
    pub const DEFAULT_FILE_NAME: &'static str = "config.json";

    /// Path of the configuration file co-located with the executable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ExecutableDir`] if the executable path is
    /// unavailable.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let exe = std::env::current_exe().map_err(ConfigError::ExecutableDir)?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(dir.join(Self::DEFAULT_FILE_NAME))
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid JSON or lacks a
    /// required key, and [`ConfigError::Invalid`] for unusable values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path.display().to_string())
    }

    /// Parse a configuration document held in memory.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus the read failure.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<memory>".to_string())
    }

    fn parse(text: &str, origin: String) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse { origin, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(invalid("name", "must not be empty"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(invalid("name", "must not contain a path separator"));
        }
        if self.input.as_os_str().is_empty() {
            return Err(invalid("input", "must not be empty"));
        }
        if self.engine.program.is_empty() {
            return Err(invalid("engine.program", "must not be empty"));
        }
        self.options_pre
            .canny
            .validate()
            .map_err(|e| invalid("options_pre.canny", e.to_string()))
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "input": "photo.png",
        "name": "run1",
        "log_dir": "log",
        "inter_dir": "inter",
        "out_dir": "out",
        "options": {
            "timer": true,
            "redirect_stdout": true,
            "redirect_stderr": false
        },
        "options_pre": {
            "log_pictures": true,
            "log_text": true,
            "canny": { "threshold1": 100, "threshold2": 200 }
        }
    }"#;

    #[test]
    fn parses_full_document() {
        let config = Config::from_json(FULL).unwrap();
        assert_eq!(config.input, PathBuf::from("photo.png"));
        assert_eq!(config.name, "run1");
        assert!(config.options.timer);
        assert!(config.options.redirect_stdout);
        assert!(!config.options.redirect_stderr);
        assert!(config.options_pre.log_pictures);
        assert_eq!(config.options_pre.canny, CannyThresholds::new(100.0, 200.0));
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let text = FULL.replacen('{', r#"{ "comment": "ignored", "version": 7, "#, 1);
        assert!(Config::from_json(&text).is_ok());
    }

    #[test]
    fn toggles_default_to_false() {
        let text = r#"{
            "input": "a.png", "name": "n", "log_dir": "l", "inter_dir": "i", "out_dir": "o",
            "options_pre": { "canny": { "threshold1": 1, "threshold2": 2 } }
        }"#;
        let config = Config::from_json(text).unwrap();
        assert_eq!(config.options, Options::default());
        assert!(!config.options_pre.log_pictures);
        assert!(!config.options_pre.log_text);
    }

    #[test]
    fn missing_required_key_is_parse_error() {
        let text = FULL.replace(r#""name": "run1","#, "");
        let err = Config::from_json(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("name"), "got: {err}");
    }

    #[test]
    fn missing_threshold_is_parse_error() {
        let text = FULL.replace(r#", "threshold2": 200"#, "");
        assert!(matches!(
            Config::from_json(&text),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            Config::from_json("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn name_with_separator_is_invalid() {
        let text = FULL.replace(r#""run1""#, r#""a/b""#);
        assert!(matches!(
            Config::from_json(&text),
            Err(ConfigError::Invalid { key: "name", .. })
        ));
    }

    #[test]
    fn negative_threshold_is_invalid() {
        let text = FULL.replace("100", "-3");
        assert!(matches!(
            Config::from_json(&text),
            Err(ConfigError::Invalid {
                key: "options_pre.canny",
                ..
            })
        ));
    }

    #[test]
    fn engine_section_overrides_defaults() {
        let text = FULL.replacen(
            '{',
            r#"{ "engine": { "program": "r2v", "flags": ["-t"], "check_status": false }, "#,
            1,
        );
        let config = Config::from_json(&text).unwrap();
        assert_eq!(config.engine.program, "r2v");
        assert_eq!(config.engine.args, EngineConfig::default().args);
        assert_eq!(config.engine.flags, vec!["-t".to_string()]);
        assert!(!config.engine.check_status);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Config::DEFAULT_FILE_NAME);
        std::fs::write(&path, FULL).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.name, "run1");
    }

    #[test]
    fn default_path_is_next_to_executable() {
        let path = Config::default_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "config.json");
    }
}
