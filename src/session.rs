//! Prompt loop and the command entry points built on the catalog, the
//! renderer and the playback queue.

use crate::catalog::{Catalog, SearchResult};
use crate::interrupt::Interrupt;
use crate::player::{PlayMode, Player};
use crate::queue::play_queue;
use crate::renderer::Renderer;
use crate::utils::is_quit;
use crate::{Result, DEFAULT_LIMIT};
use log::debug;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const QUIT_HINT: &str = "Type 'q' to quit at any prompt.";
pub const QUERY_PROMPT: &str = "Search YouTube: ";
pub const PICK_PROMPT: &str = "Pick a number to play (or blank to exit): ";
pub const MODE_PROMPT: &str = "Play as (a)udio or (v)ideo? [a]: ";

/// A trimmed answer to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A quit sentinel, or end of input
    Quit,
    Text(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid number.")]
    NotANumber,

    #[error("Out of range.")]
    OutOfRange,
}

/// Map a 1-based selection to a zero-based index into `count` results
pub fn parse_selection(input: &str, count: usize) -> std::result::Result<usize, SelectionError> {
    let input = input.trim();
    let value: i64 = match input.parse() {
        Ok(value) => value,
        Err(_) if is_integer_literal(input) => return Err(SelectionError::OutOfRange),
        Err(_) => return Err(SelectionError::NotANumber),
    };
    if value < 1 || value as u64 > count as u64 {
        return Err(SelectionError::OutOfRange);
    }
    Ok(value as usize - 1)
}

/// Digits with an optional sign, too large for `i64`
fn is_integer_literal(input: &str) -> bool {
    let digits = input.strip_prefix(['+', '-']).unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One invocation of the command layer
pub struct Session<C, P, R, W: Write> {
    catalog: C,
    player: P,
    input: R,
    renderer: Renderer<W>,
    interrupt: Interrupt,
}

impl<C, P, R, W> Session<C, P, R, W>
where
    C: Catalog,
    P: Player,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(catalog: C, player: P, input: R, renderer: Renderer<W>, interrupt: Interrupt) -> Self {
        Self {
            catalog,
            player,
            input,
            renderer,
            interrupt,
        }
    }

    pub fn into_renderer(self) -> Renderer<W> {
        self.renderer
    }

    /// Show `prompt` and read one line, unless the interrupt fires first
    async fn ask(&mut self, prompt: &str) -> Result<Reply> {
        self.renderer.prompt(prompt)?;
        let mut line = String::new();
        let read = self.interrupt.guard(self.input.read_line(&mut line)).await??;
        if read == 0 {
            debug!("End of input at prompt");
            return Ok(Reply::Quit);
        }
        let reply = line.trim();
        if is_quit(reply) {
            return Ok(Reply::Quit);
        }
        Ok(Reply::Text(reply.to_string()))
    }

    /// Prompt for a query, list results, pick one, pick a mode, then autoplay
    pub async fn interactive(&mut self) -> Result<()> {
        self.renderer.message(QUIT_HINT)?;
        let Reply::Text(query) = self.ask(QUERY_PROMPT).await? else {
            return Ok(());
        };
        if query.is_empty() {
            return self.renderer.message("No query provided.");
        }
        let entries = self.catalog.search(&query, DEFAULT_LIMIT).await?;
        self.pick_and_play(&entries, None).await
    }

    /// Search, list, pick one, then autoplay in `mode`
    pub async fn quick_search(&mut self, query: &str, limit: u32, mode: PlayMode) -> Result<()> {
        let entries = self.catalog.search(query, limit).await?;
        self.pick_and_play(&entries, Some(mode)).await
    }

    /// Search and list only
    pub async fn search(&mut self, query: &str, limit: u32) -> Result<()> {
        let entries = self.catalog.search(query, limit).await?;
        if entries.is_empty() {
            return self.renderer.message("No results.");
        }
        self.renderer.render_results(&entries)
    }

    /// Play `target` directly, or its best search match when `by_search` is set
    pub async fn play(&mut self, target: &str, mode: PlayMode, by_search: bool) -> Result<()> {
        let url = if by_search {
            let Some(entry) = self.catalog.resolve(target).await? else {
                return self.renderer.message("No results.");
            };
            match entry.playable_url() {
                Some(url) => url.to_string(),
                None => return self.renderer.message("Missing URL for selection."),
            }
        } else {
            target.to_string()
        };
        self.player.play(&url, mode).await
    }

    /// `mode` of `None` asks the user for it after the selection
    async fn pick_and_play(&mut self, entries: &[SearchResult], mode: Option<PlayMode>) -> Result<()> {
        if entries.is_empty() {
            return self.renderer.message("No results.");
        }
        self.renderer.render_results(entries)?;

        let Reply::Text(choice) = self.ask(PICK_PROMPT).await? else {
            return Ok(());
        };
        if choice.is_empty() {
            return Ok(());
        }
        let index = match parse_selection(&choice, entries.len()) {
            Ok(index) => index,
            Err(e) => return self.renderer.message(&e.to_string()),
        };

        let mode = match mode {
            Some(mode) => mode,
            None => match self.ask(MODE_PROMPT).await? {
                Reply::Quit => return Ok(()),
                Reply::Text(reply) => PlayMode::from_reply(&reply),
            },
        };

        play_queue(&self.player, &mut self.renderer, &self.interrupt, entries, index, mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeCatalog {
        entries: Vec<SearchResult>,
        queries: RefCell<Vec<(String, u32)>>,
    }

    impl Catalog for FakeCatalog {
        async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>> {
            self.queries.borrow_mut().push((query.to_string(), limit));
            Ok(self.entries.iter().take(limit as usize).cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakePlayer {
        played: RefCell<Vec<(String, PlayMode)>>,
    }

    impl Player for FakePlayer {
        async fn play(&self, url: &str, mode: PlayMode) -> Result<()> {
            self.played.borrow_mut().push((url.to_string(), mode));
            Ok(())
        }
    }

    fn results(n: usize) -> Vec<SearchResult> {
        (1..=n)
            .map(|i| SearchResult {
                title: Some(format!("Song {i}")),
                webpage_url: Some(format!("https://example/{i}")),
                duration: Some(60 * i as u64),
                ..Default::default()
            })
            .collect()
    }

    type TestSession = Session<FakeCatalog, FakePlayer, &'static [u8], Vec<u8>>;

    fn session(entries: Vec<SearchResult>, input: &'static str) -> TestSession {
        Session::new(
            FakeCatalog {
                entries,
                ..Default::default()
            },
            FakePlayer::default(),
            input.as_bytes(),
            Renderer::new(Vec::new(), false),
            Interrupt::never(),
        )
    }

    fn played(session: &TestSession) -> Vec<(String, PlayMode)> {
        session.player.played.borrow().clone()
    }

    fn output(session: TestSession) -> String {
        String::from_utf8(session.into_renderer().into_inner()).unwrap()
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3), Ok(0));
        assert_eq!(parse_selection("3", 3), Ok(2));
        assert_eq!(parse_selection(" 2 ", 3), Ok(1));
        assert_eq!(parse_selection("0", 3), Err(SelectionError::OutOfRange));
        assert_eq!(parse_selection("-1", 3), Err(SelectionError::OutOfRange));
        assert_eq!(parse_selection("4", 3), Err(SelectionError::OutOfRange));
        assert_eq!(parse_selection("abc", 3), Err(SelectionError::NotANumber));
        assert_eq!(parse_selection("1.5", 3), Err(SelectionError::NotANumber));
        assert_eq!(parse_selection("99999999999999999999", 3), Err(SelectionError::OutOfRange));
        assert_eq!(parse_selection("", 3), Err(SelectionError::NotANumber));
        assert_eq!(parse_selection("+", 3), Err(SelectionError::NotANumber));
    }

    #[tokio::test]
    async fn test_interactive_full_flow() {
        let mut s = session(results(4), "lofi beats\n2\nv\n");
        s.interactive().await.unwrap();
        assert_eq!(*s.catalog.queries.borrow(), vec![("lofi beats".to_string(), DEFAULT_LIMIT)]);
        assert_eq!(
            played(&s),
            vec![
                ("https://example/2".to_string(), PlayMode::Video),
                ("https://example/3".to_string(), PlayMode::Video),
                ("https://example/4".to_string(), PlayMode::Video),
            ]
        );
        let out = output(s);
        assert!(out.starts_with(QUIT_HINT));
        assert!(out.contains(" 1. Song 1 [1:00] - ?\n"));
        assert!(out.contains("Now playing: Song 2\n"));
    }

    #[tokio::test]
    async fn test_interactive_defaults_to_audio() {
        let mut s = session(results(2), "query\n2\n\n");
        s.interactive().await.unwrap();
        assert_eq!(played(&s), vec![("https://example/2".to_string(), PlayMode::Audio)]);
    }

    #[tokio::test]
    async fn test_quit_at_query_prompt_does_nothing() {
        for input in ["q\n", "Q\n", "quit\n", "QUIT\n", "exit\n", ""] {
            let mut s = session(results(2), input);
            s.interactive().await.unwrap();
            assert!(s.catalog.queries.borrow().is_empty(), "input {input:?}");
            assert!(played(&s).is_empty());
        }
    }

    #[tokio::test]
    async fn test_quit_at_selection_and_mode_prompts() {
        let mut s = session(results(2), "query\nexit\n");
        s.interactive().await.unwrap();
        assert_eq!(s.catalog.queries.borrow().len(), 1);
        assert!(played(&s).is_empty());

        let mut s = session(results(2), "query\n1\nq\n");
        s.interactive().await.unwrap();
        assert!(played(&s).is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_is_reported() {
        let mut s = session(results(2), "   \n");
        s.interactive().await.unwrap();
        assert!(s.catalog.queries.borrow().is_empty());
        assert!(output(s).contains("No query provided.\n"));
    }

    #[tokio::test]
    async fn test_invalid_selection_aborts_without_retry() {
        let mut s = session(results(2), "query\nabc\n1\n");
        s.interactive().await.unwrap();
        assert!(played(&s).is_empty());
        assert!(output(s).contains("Invalid number.\n"));

        let mut s = session(results(2), "query\n3\n");
        s.interactive().await.unwrap();
        assert!(played(&s).is_empty());
        assert!(output(s).contains("Out of range.\n"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let mut s = session(Vec::new(), "query\n");
        s.interactive().await.unwrap();
        assert!(output(s).contains("No results.\n"));
    }

    #[tokio::test]
    async fn test_quick_search_uses_given_mode_without_asking() {
        let mut s = session(results(5), "4\n");
        s.quick_search("jazz", 5, PlayMode::Audio).await.unwrap();
        assert_eq!(*s.catalog.queries.borrow(), vec![("jazz".to_string(), 5)]);
        assert_eq!(
            played(&s),
            vec![
                ("https://example/4".to_string(), PlayMode::Audio),
                ("https://example/5".to_string(), PlayMode::Audio),
            ]
        );
        assert!(!output(s).contains(MODE_PROMPT));
    }

    #[tokio::test]
    async fn test_quick_search_blank_selection_exits() {
        let mut s = session(results(3), "\n");
        s.quick_search("jazz", 3, PlayMode::Video).await.unwrap();
        assert!(played(&s).is_empty());
    }

    #[tokio::test]
    async fn test_search_lists_only() {
        let mut s = session(results(3), "");
        s.search("hello world", 3).await.unwrap();
        assert!(played(&s).is_empty());
        let out = output(s);
        assert!(out.contains(" 1. Song 1 [1:00] - ?\n    https://example/1\n"));
        assert!(out.contains(" 3. Song 3 [3:00] - ?\n"));
        assert!(!out.contains(PICK_PROMPT));
    }

    #[tokio::test]
    async fn test_play_direct_url_skips_catalog() {
        let mut s = session(results(3), "");
        s.play("https://example/video", PlayMode::Video, false).await.unwrap();
        assert!(s.catalog.queries.borrow().is_empty());
        assert_eq!(played(&s), vec![("https://example/video".to_string(), PlayMode::Video)]);
    }

    #[tokio::test]
    async fn test_play_by_search_resolves_first_result() {
        let mut s = session(results(3), "");
        s.play("some song", PlayMode::Audio, true).await.unwrap();
        assert_eq!(*s.catalog.queries.borrow(), vec![("some song".to_string(), 1)]);
        assert_eq!(played(&s), vec![("https://example/1".to_string(), PlayMode::Audio)]);
    }

    #[tokio::test]
    async fn test_play_by_search_without_url() {
        let entries = vec![SearchResult {
            title: Some("No link".to_string()),
            ..Default::default()
        }];
        let mut s = session(entries, "");
        s.play("some song", PlayMode::Audio, true).await.unwrap();
        assert!(played(&s).is_empty());
        assert!(output(s).contains("Missing URL for selection.\n"));

        let mut s = session(Vec::new(), "");
        s.play("some song", PlayMode::Audio, true).await.unwrap();
        assert!(output(s).contains("No results.\n"));
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt() {
        let (trigger, interrupt) = Interrupt::manual();
        let mut s: TestSession = Session::new(
            FakeCatalog::default(),
            FakePlayer::default(),
            "".as_bytes(),
            Renderer::new(Vec::new(), false),
            interrupt,
        );
        trigger.trigger();
        let result = s.interactive().await;
        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(s.catalog.queries.borrow().is_empty());
    }
}
