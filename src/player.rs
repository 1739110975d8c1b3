use crate::process::{ProcessRunner, Tool, INTERRUPT_GRACE};
use crate::{Error, Result};
use log::{debug, info};
use std::path::PathBuf;

/// mpv's exit status when it quits because of a signal
pub const MPV_EXIT_SIGNAL: i32 = 4;

/// What the player renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Audio,
    Video,
}

impl PlayMode {
    pub fn from_video_flag(video: bool) -> Self {
        if video {
            PlayMode::Video
        } else {
            PlayMode::Audio
        }
    }

    /// Parse the reply to the audio/video prompt; anything but `v` is audio
    pub fn from_reply(reply: &str) -> Self {
        Self::from_video_flag(reply.trim().eq_ignore_ascii_case("v"))
    }
}

/// Something that can play a URL to completion
#[allow(async_fn_in_trait)]
pub trait Player {
    /// Play `url`, returning once playback has ended
    async fn play(&self, url: &str, mode: PlayMode) -> Result<()>;
}

/// mpv backed player; mpv owns the terminal while it runs
#[derive(Debug, Clone)]
pub struct Mpv {
    binary: PathBuf,
    runner: ProcessRunner,
}

impl Mpv {
    pub fn new(runner: ProcessRunner) -> Self {
        Self::with_binary(Tool::Mpv.binary(), runner)
    }

    pub fn with_binary(path: impl Into<PathBuf>, runner: ProcessRunner) -> Self {
        Self {
            binary: path.into(),
            runner,
        }
    }

    pub fn args(url: &str, mode: PlayMode) -> Vec<String> {
        let mode_flag = match mode {
            PlayMode::Audio => "--no-video",
            PlayMode::Video => "--vid=auto",
        };
        vec![
            "--ytdl=yes".to_string(),
            mode_flag.to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }
}

impl Player for Mpv {
    async fn play(&self, url: &str, mode: PlayMode) -> Result<()> {
        info!("Playing {} ({:?})", url, mode);
        let status = self
            .runner
            .run_interactive(Tool::Mpv, &self.binary, &Self::args(url, mode))
            .await?;

        if !status.success() {
            debug!("mpv finished with {}", status);
            let by_signal = status.code().map_or(true, |code| code == MPV_EXIT_SIGNAL);
            if by_signal && self.runner.interrupt().arrives_within(INTERRUPT_GRACE).await {
                return Err(Error::Interrupted);
            }
        }
        Ok(())
    }
}
