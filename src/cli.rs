use crate::process::Tool;
use crate::DEFAULT_LIMIT;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Search and play right away, autoplaying the following results
    #[arg(short = 's', long = "search", value_name = "QUERY")]
    pub quick_search: Option<String>,

    /// Number of results for -s/--search
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Play video instead of audio for -s/--search
    #[arg(short = 'v', long)]
    pub video: bool,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search YouTube and list the results
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,

        /// Max results
        #[arg(long, default_value_t = DEFAULT_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },

    /// Play a URL or search term
    Play {
        /// URL or search query
        #[arg(required = true)]
        target: Vec<String>,

        /// Play video instead of audio
        #[arg(long)]
        video: bool,

        /// Treat target as search query
        #[arg(long)]
        search: bool,
    },

    /// Interactive search and play
    Interactive,
}

/// What a single invocation does once arguments are parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    QuickSearch { query: String, limit: u32, video: bool },
    Search { query: String, limit: u32 },
    Play { target: String, video: bool, by_search: bool },
    Interactive,
}

impl Action {
    /// Tools that must be on `PATH` before the action starts
    pub fn required_tools(&self) -> &'static [Tool] {
        match self {
            Action::Search { .. } => &[Tool::YtDlp],
            _ => &[Tool::YtDlp, Tool::Mpv],
        }
    }
}

impl Cli {
    /// Resolve flags and subcommand into one action.
    ///
    /// A non-empty -s/--search wins over a subcommand; an empty one counts as absent.
    pub fn action(&self) -> Action {
        if let Some(query) = self.quick_search.as_ref().filter(|q| !q.is_empty()) {
            return Action::QuickSearch {
                query: query.clone(),
                limit: self.limit,
                video: self.video,
            };
        }
        match &self.command {
            None | Some(Command::Interactive) => Action::Interactive,
            Some(Command::Search { query, limit }) => Action::Search {
                query: query.join(" "),
                limit: *limit,
            },
            Some(Command::Play { target, video, search }) => Action::Play {
                target: target.join(" "),
                video: *video,
                by_search: *search,
            },
        }
    }
}
