//! Sequential autoplay over a result list.

use crate::catalog::SearchResult;
use crate::interrupt::Interrupt;
use crate::player::{PlayMode, Player};
use crate::renderer::{Renderer, AUTOPLAY_NOTICE};
use crate::{Error, Result};
use log::debug;
use std::io::Write;

/// A cursor over a result list that only moves forward from its start.
#[derive(Debug, Clone)]
pub struct PlaybackQueue<'a> {
    entries: &'a [SearchResult],
    cursor: usize,
}

impl<'a> PlaybackQueue<'a> {
    /// `None` when `start` does not point at an entry
    pub fn new(entries: &'a [SearchResult], start: usize) -> Option<Self> {
        (start < entries.len()).then_some(Self { entries, cursor: start })
    }
}

impl<'a> Iterator for PlaybackQueue<'a> {
    /// Zero-based index, entry and its URL; entries without a URL are skipped
    type Item = (usize, &'a SearchResult, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.entries.get(self.cursor) {
            let index = self.cursor;
            self.cursor += 1;
            match entry.playable_url() {
                Some(url) => return Some((index, entry, url)),
                None => debug!("Skipping entry {} without a URL", index + 1),
            }
        }
        None
    }
}

/// Play `entries` from `start` to the end, one at a time.
///
/// An out-of-range start or an empty list does nothing. Each playable entry
/// clears the screen, prints a banner and blocks until the player exits.
/// An interrupt ends the whole queue with [`Error::Interrupted`].
pub async fn play_queue<P: Player, W: Write>(
    player: &P,
    renderer: &mut Renderer<W>,
    interrupt: &Interrupt,
    entries: &[SearchResult],
    start: usize,
    mode: PlayMode,
) -> Result<()> {
    let Some(queue) = PlaybackQueue::new(entries, start) else {
        debug!("Start index {} outside of {} entries", start, entries.len());
        return Ok(());
    };

    renderer.message(AUTOPLAY_NOTICE)?;
    for (index, entry, url) in queue {
        if interrupt.is_triggered() {
            return Err(Error::Interrupted);
        }
        debug!("Queue entry {} of {}", index + 1, entries.len());
        renderer.clear()?;
        renderer.now_playing(entry.title())?;
        player.play(url, mode).await?;
    }
    debug!("Queue finished");
    Ok(())
}
