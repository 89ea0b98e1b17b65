//! Subprocess execution with optional capture of the child's output
//! streams to log files.
//!
//! Commands are spawned directly, never through a shell, so paths with
//! spaces or quotes need no escaping.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::process::{Command, ExitStatus, Stdio};

use crate::config::Options;
use crate::error::HarnessError;
use crate::workspace::Workspace;

/// A child process output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl Stream {
    /// Extension of the log file capturing this stream.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// A fully assembled command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl EngineCommand {
    /// Start a command line with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The executable.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// The arguments, in order.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Space-separated rendering for log lines.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs commands synchronously, capturing streams per [`Options`].
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner<'a> {
    workspace: &'a Workspace,
    redirect_stdout: bool,
    redirect_stderr: bool,
}

impl<'a> CommandRunner<'a> {
    /// Create a runner writing stream logs into `workspace`'s log directory.
    #[must_use]
    pub const fn new(workspace: &'a Workspace, options: &Options) -> Self {
        Self {
            workspace,
            redirect_stdout: options.redirect_stdout,
            redirect_stderr: options.redirect_stderr,
        }
    }

    /// Run `command` under the logical `name` and wait for it to exit.
    ///
    /// With redirection enabled, the stream goes to
    /// `<log>/log_<name>.stdout` (or `.stderr`), replacing any earlier
    /// content; otherwise it is inherited from this process. The exit
    /// status is returned as-is; judging it is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::StreamLog`] if a log file cannot be created
    /// and [`HarnessError::Spawn`] if the process cannot be started.
    pub fn run(&self, name: &str, command: &EngineCommand) -> Result<ExitStatus, HarnessError> {
        let stdout = self.target(name, Stream::Stdout, self.redirect_stdout)?;
        let stderr = self.target(name, Stream::Stderr, self.redirect_stderr)?;

        tracing::info!(command = %command.display(), "running {name}");
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|source| HarnessError::Spawn {
                command: command.display(),
                source,
            })?;
        tracing::debug!(%status, "{name} exited");
        Ok(status)
    }

    fn target(&self, name: &str, stream: Stream, redirect: bool) -> Result<Stdio, HarnessError> {
        if !redirect {
            return Ok(Stdio::inherit());
        }
        let path = self.workspace.stream_log_path(name, stream);
        let file = File::create(&path).map_err(|source| HarnessError::StreamLog {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "capturing {}", stream.extension());
        Ok(Stdio::from(file))
    }
}
