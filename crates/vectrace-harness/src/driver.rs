//! The four-stage pipeline: input, canny, core, svg2png.
//!
//! Stages always run once each, in that order, with no branching. Each
//! stage's artifact is handed to the next as a return value; the first
//! error aborts the run.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use image::{DynamicImage, GrayImage};

use crate::artifact::{read_image, write_gray_jpeg, write_jpeg};
use crate::command::{CommandRunner, EngineCommand};
use crate::config::Config;
use crate::convert::{ConversionSummary, convert_svg_directory};
use crate::error::HarnessError;
use crate::stage::{Clock, Stage, StageName, StageObserver, StageRunner};
use crate::workspace::Workspace;

/// Edge map produced by the canny stage and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannyArtifact {
    /// Binary edge map.
    pub image: GrayImage,
    /// Location of the JPEG handed to the engine.
    pub path: PathBuf,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Output of the canny stage.
    pub edges: CannyArtifact,
    /// Exit status of the engine.
    pub engine_status: ExitStatus,
    /// Output of the svg2png stage.
    pub conversion: ConversionSummary,
}

/// Binds a configuration to a prepared workspace.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    config: &'a Config,
    workspace: &'a Workspace,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over an already prepared workspace.
    #[must_use]
    pub const fn new(config: &'a Config, workspace: &'a Workspace) -> Self {
        Self { config, workspace }
    }

    /// Run all four stages through `runner`.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, unmodified. Later stages do not run.
    pub fn run<C, O>(&self, runner: &mut StageRunner<C, O>) -> Result<RunOutcome, HarnessError>
    where
        C: Clock,
        O: StageObserver,
    {
        let source = Stage::new(StageName::Input, || self.load_input()).run(runner)?;
        let edges = Stage::new(StageName::Canny, || self.detect_edges(&source)).run(runner)?;
        let engine_status =
            Stage::new(StageName::Core, || self.run_engine(&edges.path)).run(runner)?;
        let conversion = Stage::new(StageName::Svg2Png, || self.convert_drawings()).run(runner)?;

        Ok(RunOutcome {
            edges,
            engine_status,
            conversion,
        })
    }

    /// Decode the configured input image.
    ///
    /// # Errors
    ///
    /// [`HarnessError::ImageLoad`] or, for the optional snapshot,
    /// [`HarnessError::ImageWrite`].
    pub fn load_input(&self) -> Result<DynamicImage, HarnessError> {
        let image = read_image(&self.config.input)?;
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "loaded {}",
            self.config.input.display()
        );
        if self.config.options_pre.log_pictures {
            write_jpeg(&image, &self.workspace.snapshot_path(StageName::Input))?;
        }
        Ok(image)
    }

    /// Run edge detection and write the edge map for the engine.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Filter`] if the thresholds or image size are
    /// unusable, [`HarnessError::ImageWrite`] if the map cannot be saved.
    pub fn detect_edges(&self, source: &DynamicImage) -> Result<CannyArtifact, HarnessError> {
        let image = vectrace_pipeline::preprocess(source, self.config.options_pre.canny)?;
        tracing::debug!(
            edge_pixels = vectrace_pipeline::count_edge_pixels(&image),
            "edge map ready"
        );

        let path = self.workspace.intermediate_path(StageName::Canny);
        write_gray_jpeg(&image, &path)?;
        if self.config.options_pre.log_pictures {
            write_gray_jpeg(&image, &self.workspace.snapshot_path(StageName::Canny))?;
        }
        Ok(CannyArtifact { image, path })
    }

    /// Command line for the engine, given the edge map it should read.
    #[must_use]
    pub fn engine_command(&self, edges: &Path) -> EngineCommand {
        let engine = &self.config.engine;
        EngineCommand::new(&engine.program)
            .args(&engine.args)
            .arg("--origin")
            .arg(&self.config.input)
            .arg("--input")
            .arg(edges)
            .arg("--intermediate")
            .arg(self.workspace.inter_dir())
            .arg("--log-directory")
            .arg(self.workspace.log_dir())
            .args(&engine.flags)
    }

    /// Invoke the engine and wait for it.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Spawn`] or [`HarnessError::StreamLog`] from the
    /// runner, and [`HarnessError::EngineFailed`] for a non-zero exit when
    /// `engine.check_status` is set.
    pub fn run_engine(&self, edges: &Path) -> Result<ExitStatus, HarnessError> {
        let command = self.engine_command(edges);
        let status = CommandRunner::new(self.workspace, &self.config.options)
            .run(StageName::Core.as_str(), &command)?;

        if !status.success() {
            if self.config.engine.check_status {
                return Err(HarnessError::EngineFailed {
                    command: command.display(),
                    status,
                });
            }
            tracing::warn!(%status, "engine reported failure, continuing");
        }
        Ok(status)
    }

    /// Render every SVG the engine left in the log directory.
    ///
    /// # Errors
    ///
    /// See [`convert_svg_directory`].
    pub fn convert_drawings(&self) -> Result<ConversionSummary, HarnessError> {
        convert_svg_directory(self.workspace.log_dir())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::ffi::OsString;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn config(root: &Path, log_pictures: bool) -> Config {
        Config::from_json(&format!(
            r#"{{
                "input": "{0}/photo.png", "name": "run1",
                "log_dir": "{0}/log", "inter_dir": "{0}/inter", "out_dir": "{0}/out",
                "options_pre": {{
                    "log_pictures": {log_pictures},
                    "canny": {{ "threshold1": 50, "threshold2": 150 }}
                }}
            }}"#,
            root.display()
        ))
        .unwrap()
    }

    fn workspace(config: &Config) -> Workspace {
        let started = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Workspace::prepare(config, &started).unwrap()
    }

    fn step_image() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(32, 32, |x, _| {
            image::Luma([if x < 16 { 0 } else { 255 }])
        }))
    }

    #[test]
    fn engine_command_places_paths_between_args_and_flags() {
        let cfg = config(Path::new("/w"), false);
        let ws = Workspace::layout(&cfg, &Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let cmd = Pipeline::new(&cfg, &ws).engine_command(Path::new("/w/inter/run1_canny.jpg"));

        let expected: Vec<OsString> = [
            "run",
            "--release",
            "--",
            "--origin",
            "/w/photo.png",
            "--input",
            "/w/inter/run1_canny.jpg",
            "--intermediate",
            "/w/inter",
            "--log-directory",
            "/w/log/01_12:00:00",
            "-i",
            "-t",
            "-T",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(cmd.program(), "cargo");
        assert_eq!(cmd.arguments(), expected.as_slice());
    }

    #[test]
    fn detect_edges_writes_intermediate_only_by_default() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), false);
        let ws = workspace(&cfg);

        let artifact = Pipeline::new(&cfg, &ws).detect_edges(&step_image()).unwrap();
        assert_eq!(artifact.path, root.path().join("inter/run1_canny.jpg"));
        assert!(artifact.path.is_file());
        assert!(!ws.snapshot_path(StageName::Canny).exists());
        assert!(vectrace_pipeline::count_edge_pixels(&artifact.image) > 0);
    }

    #[test]
    fn snapshots_written_when_enabled() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), true);
        step_image().save(&cfg.input).unwrap();
        let ws = workspace(&cfg);
        let pipeline = Pipeline::new(&cfg, &ws);

        let source = pipeline.load_input().unwrap();
        pipeline.detect_edges(&source).unwrap();
        assert!(ws.log_dir().join("run1_pre_input.jpg").is_file());
        assert!(ws.log_dir().join("run1_pre_canny.jpg").is_file());
    }

    #[test]
    fn tiny_input_is_filter_error() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), false);
        let ws = workspace(&cfg);
        let tiny = DynamicImage::ImageLuma8(GrayImage::new(2, 2));

        let err = Pipeline::new(&cfg, &ws).detect_edges(&tiny).unwrap_err();
        assert!(matches!(err, HarnessError::Filter(_)));
        assert!(!ws.intermediate_path(StageName::Canny).exists());
    }

    #[test]
    fn missing_input_is_image_load_error() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), true);
        let ws = workspace(&cfg);

        let err = Pipeline::new(&cfg, &ws).load_input().unwrap_err();
        assert!(matches!(err, HarnessError::ImageLoad { .. }));
        assert!(!ws.snapshot_path(StageName::Input).exists());
    }
}
