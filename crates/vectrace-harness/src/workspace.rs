//! Run workspace: the log, intermediate and output directories.
//!
//! The log directory gets a per-run subdirectory named after the process
//! start time with second resolution, so sequential runs never share logs.
//! Two runs started within the same second do share one.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::command::Stream;
use crate::config::Config;
use crate::error::HarnessError;
use crate::stage::StageName;

/// `strftime` pattern of the per-run log directory: day, hour, minute, second.
pub const RUN_DIR_FORMAT: &str = "%d_%H:%M:%S";

/// Name of the per-run log directory for a run started at `timestamp`.
#[must_use]
pub fn run_directory_name<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    timestamp.format(RUN_DIR_FORMAT).to_string()
}

/// Directories a run reads from and writes to.
///
/// Created eagerly before any stage runs and never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    name: String,
    log_dir: PathBuf,
    inter_dir: PathBuf,
    out_dir: PathBuf,
}

impl Workspace {
    /// Compute the workspace layout without touching the filesystem.
    #[must_use]
    pub fn layout<Tz>(config: &Config, started: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            name: config.name.clone(),
            log_dir: config.log_dir.join(run_directory_name(started)),
            inter_dir: config.inter_dir.clone(),
            out_dir: config.out_dir.clone(),
        }
    }

    /// Compute the layout and create every directory, parents included.
    ///
    /// Directories that already exist are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Workspace`] naming the directory that could
    /// not be created.
    pub fn prepare<Tz>(config: &Config, started: &DateTime<Tz>) -> Result<Self, HarnessError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let workspace = Self::layout(config, started);
        workspace.create()?;
        Ok(workspace)
    }

    /// Create every directory of this workspace.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Workspace`] on the first failure.
    pub fn create(&self) -> Result<(), HarnessError> {
        for dir in self.directories() {
            std::fs::create_dir_all(dir).map_err(|source| HarnessError::Workspace {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        tracing::debug!(
            log = %self.log_dir.display(),
            inter = %self.inter_dir.display(),
            out = %self.out_dir.display(),
            "workspace ready",
        );
        Ok(())
    }

    /// Per-run log directory.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Intermediate artifact directory.
    #[must_use]
    pub fn inter_dir(&self) -> &Path {
        &self.inter_dir
    }

    /// All three directories: log, intermediate, output.
    #[must_use]
    pub fn directories(&self) -> [&Path; 3] {
        [&self.log_dir, &self.inter_dir, &self.out_dir]
    }

    /// `<log>/<name>_pre_<stage>.jpg`
    #[must_use]
    pub fn snapshot_path(&self, stage: StageName) -> PathBuf {
        self.log_dir.join(format!("{}_pre_{stage}.jpg", self.name))
    }

    /// `<inter>/<name>_<stage>.jpg`
    #[must_use]
    pub fn intermediate_path(&self, stage: StageName) -> PathBuf {
        self.inter_dir.join(format!("{}_{stage}.jpg", self.name))
    }

    /// `<log>/log_<name>.stdout` or `.stderr`
    #[must_use]
    pub fn stream_log_path(&self, name: &str, stream: Stream) -> PathBuf {
        self.log_dir.join(format!("log_{name}.{}", stream.extension()))
    }
}
