use crate::indicator::Indicator;
use crate::interrupt::Interrupt;
use crate::{Error, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// How long an abnormal child exit waits for a racing Ctrl+C before it is
/// reported as a failure. The child sees the same SIGINT and may exit first.
pub const INTERRUPT_GRACE: Duration = Duration::from_millis(250);

/// External executables this program drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    YtDlp,
    Mpv,
}

impl Tool {
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::YtDlp => "yt-dlp",
            Tool::Mpv => "mpv",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            Tool::YtDlp => "Install yt-dlp (package or pip) and try again.",
            Tool::Mpv => "Install mpv and try again.",
        }
    }

    /// Locate the executable on `PATH`
    pub fn resolve(&self) -> Result<PathBuf> {
        match which::which(self.binary()) {
            Ok(path) => {
                debug!("Found {} at {}", self.binary(), path.display());
                Ok(path)
            }
            Err(e) => {
                debug!("Lookup of {} failed: {}", self.binary(), e);
                Err(Error::MissingTool(*self))
            }
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Resolve every tool up front, failing on the first one missing
pub fn require_tools(tools: &[Tool]) -> Result<()> {
    for tool in tools {
        tool.resolve()?;
    }
    Ok(())
}

fn spawn_error(tool: Tool, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::MissingTool(tool)
    } else {
        Error::Io(e)
    }
}

/// Runs external tools with arguments passed straight to the OS, never
/// through a shell.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interrupt: Interrupt,
    show_progress: bool,
}

impl ProcessRunner {
    /// Progress indicators are shown only when stdout is a terminal
    pub fn new(interrupt: Interrupt) -> Self {
        Self {
            interrupt,
            show_progress: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Run a tool with captured output and decode its stdout as one JSON document.
    ///
    /// When `label` is given and stdout is a terminal, a liveness indicator
    /// runs until the child exits and is joined before the output is read.
    pub async fn run_json<T: DeserializeOwned>(
        &self,
        tool: Tool,
        program: impl Into<PathBuf>,
        args: &[String],
        label: Option<&str>,
    ) -> Result<T> {
        let program = program.into();
        debug!("Running {} {:?}", program.display(), args);

        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(tool, e))?;

        let indicator = match label {
            Some(label) if self.show_progress => Some(Indicator::start(label)),
            _ => None,
        };

        let waited = self.interrupt.guard(child.wait_with_output()).await;

        if let Some(indicator) = indicator {
            indicator.stop().await;
        }

        let output = waited??;
        debug!("{} exited with {}", tool, output.status);

        if !output.status.success() {
            if self.interrupt.arrives_within(INTERRUPT_GRACE).await {
                return Err(Error::Interrupted);
            }
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} failed with {}", tool, output.status);
            return Err(Error::CommandFailed {
                tool,
                code: output.status.code(),
                stderr,
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| Error::MalformedPayload { tool, source })
    }

    /// Run a tool attached to the terminal and wait for it to exit.
    ///
    /// The child is killed if the wait is abandoned on interrupt.
    pub async fn run_interactive(
        &self,
        tool: Tool,
        program: impl Into<PathBuf>,
        args: &[String],
    ) -> Result<ExitStatus> {
        let program = program.into();
        debug!("Running {} {:?}", program.display(), args);

        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(tool, e))?;

        let status = self.interrupt.guard(child.wait()).await??;
        debug!("{} exited with {}", tool, status);
        Ok(status)
    }
}
