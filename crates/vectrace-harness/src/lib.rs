//! Staged batch harness around an external raster-to-vector engine.
//!
//! A run loads a [`Config`], prepares a [`Workspace`] with a timestamped
//! log directory, then drives four stages through a [`StageRunner`]:
//!
//! 1. **input**: decode the source image
//! 2. **canny**: edge-detect it and write the edge map for the engine
//! 3. **core**: run the engine as a subprocess, optionally capturing its
//!    output streams into the log directory
//! 4. **svg2png**: rasterize every SVG the engine left in the log directory
//!
//! Every stage is wrapped with the same start/end logging and optional
//! timing, reported through a [`StageObserver`]. The first error aborts the
//! run and is returned unchanged.

pub mod artifact;
pub mod command;
pub mod config;
pub mod convert;
pub mod driver;
pub mod error;
pub mod report;
pub mod stage;
pub mod timer;
pub mod workspace;

pub use command::{CommandRunner, EngineCommand, Stream};
pub use config::{Config, EngineConfig, Options, PreOptions};
pub use convert::{ConversionSummary, convert_svg_directory};
pub use driver::{CannyArtifact, Pipeline, RunOutcome};
pub use error::{ConfigError, HarnessError};
pub use report::{RunReport, StageTiming};
pub use stage::{
    Clock, LogObserver, Stage, StageEvent, StageName, StageObserver, StageRunner, StageSettings,
    StdClock,
};
pub use timer::RunTimer;
pub use workspace::Workspace;
