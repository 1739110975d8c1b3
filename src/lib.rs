//! ytplay - A terminal YouTube music and video player
//!
//! Searching, metadata extraction and playback are delegated to `yt-dlp` and
//! `mpv`. This crate builds their invocations, decodes the search payload,
//! lists the results and drives sequential autoplay over a result list.

pub mod catalog;
pub mod cli;
pub mod indicator;
pub mod interrupt;
pub mod player;
pub mod process;
pub mod queue;
pub mod renderer;
pub mod session;

pub use catalog::{Catalog, SearchResult, YtDlp};
pub use cli::{Cli, Command};
pub use interrupt::Interrupt;
pub use player::{Mpv, PlayMode, Player};
pub use process::{ProcessRunner, Tool};
pub use queue::play_queue;
pub use renderer::Renderer;
pub use session::Session;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of results fetched when no limit is given
pub const DEFAULT_LIMIT: u32 = 10;

/// Inputs that end the current command at any prompt (compared case-insensitively)
pub const QUIT_SENTINELS: &[&str] = &["q", "quit", "exit"];

/// Error types used throughout the application
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("'{}' not found in PATH.\n{}", .0.binary(), .0.install_hint())]
    MissingTool(Tool),

    #[error("{} failed:", .tool.binary())]
    CommandFailed {
        tool: Tool,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse {} output.", .tool.binary())]
    MalformedPayload {
        tool: Tool,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// Process exit status this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            Error::Interrupted => 0,
            _ => 1,
        }
    }
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Utility functions
pub mod utils {
    use super::QUIT_SENTINELS;

    /// Format a duration as `H:MM:SS` or `M:SS`, or `?` when unknown
    pub fn format_duration(seconds: Option<u64>) -> String {
        let Some(total_seconds) = seconds else {
            return "?".to_string();
        };
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let secs = total_seconds % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, secs)
        } else {
            format!("{}:{:02}", minutes, secs)
        }
    }

    /// Whether a trimmed prompt reply asks to leave the current command
    pub fn is_quit(input: &str) -> bool {
        QUIT_SENTINELS.iter().any(|s| input.eq_ignore_ascii_case(s))
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        play_queue, Catalog, Cli, Command, Error, Interrupt, Mpv, PlayMode, Player,
        ProcessRunner, Renderer, Result, SearchResult, Session, Tool, YtDlp,
        utils::*,
    };
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(0)), "0:00");
        assert_eq!(format_duration(Some(45)), "0:45");
        assert_eq!(format_duration(Some(125)), "2:05");
        assert_eq!(format_duration(Some(3599)), "59:59");
        assert_eq!(format_duration(Some(3600)), "1:00:00");
        assert_eq!(format_duration(Some(3661)), "1:01:01");
        assert_eq!(format_duration(Some(36_000 + 59)), "10:00:59");
        assert_eq!(format_duration(None), "?");
    }

    #[test]
    fn test_is_quit() {
        for input in ["q", "Q", "quit", "QUIT", "exit", "Exit"] {
            assert!(is_quit(input), "{input} should quit");
        }
        for input in ["", "qq", "1", "quitter", "v"] {
            assert!(!is_quit(input), "{input} should not quit");
        }
    }

    #[test]
    fn test_exit_codes() {
        let failed = Error::CommandFailed {
            tool: Tool::YtDlp,
            code: Some(2),
            stderr: String::new(),
        };
        assert_eq!(failed.exit_code(), 2);

        let killed = Error::CommandFailed {
            tool: Tool::YtDlp,
            code: None,
            stderr: String::new(),
        };
        assert_eq!(killed.exit_code(), 1);

        assert_eq!(Error::MissingTool(Tool::Mpv).exit_code(), 1);
        assert_eq!(Error::Interrupted.exit_code(), 0);
    }

    #[test]
    fn test_missing_tool_message() {
        let message = Error::MissingTool(Tool::YtDlp).to_string();
        assert!(message.starts_with("'yt-dlp' not found in PATH."));
        assert!(message.contains("Install yt-dlp"));
    }
}
