use crate::catalog::SearchResult;
use crate::utils::format_duration;
use crate::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use log::debug;
use std::io::{stdout, Stdout, Write};

/// Shown once before autoplay starts
pub const AUTOPLAY_NOTICE: &str =
    "Autoplay on: the following results play in order. Press Ctrl+C to stop.";

/// Line-oriented terminal output for listings, prompts and banners
pub struct Renderer<W: Write = Stdout> {
    out: W,
    is_terminal: bool,
}

impl Renderer<Stdout> {
    /// Renderer over stdout; screen clearing is enabled only on a terminal
    pub fn stdout() -> Self {
        Self::new(stdout(), atty::is(atty::Stream::Stdout))
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, is_terminal: bool) -> Self {
        Self { out, is_terminal }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the numbered result list, one entry plus an optional URL line each
    pub fn render_results(&mut self, entries: &[SearchResult]) -> Result<()> {
        for (idx, entry) in entries.iter().enumerate() {
            writeln!(
                self.out,
                "{:>2}. {} [{}] - {}",
                idx + 1,
                entry.title(),
                format_duration(entry.duration),
                entry.uploader()
            )?;
            if let Some(url) = entry.playable_url() {
                writeln!(self.out, "    {}", url)?;
            }
        }
        self.out.flush()?;
        debug!("Rendered {} results", entries.len());
        Ok(())
    }

    /// Clear the screen, unless output is not a terminal
    pub fn clear(&mut self) -> Result<()> {
        if !self.is_terminal {
            return Ok(());
        }
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        debug!("Screen cleared");
        Ok(())
    }

    pub fn now_playing(&mut self, title: &str) -> Result<()> {
        self.message(&format!("Now playing: {}", title))
    }

    /// Print a line of text
    pub fn message(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()?;
        Ok(())
    }

    /// Print a prompt without a trailing newline
    pub fn prompt(&mut self, prompt: &str) -> Result<()> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        Ok(())
    }
}
