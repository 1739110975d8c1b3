use ytplay::cli::Action;
use ytplay::process::require_tools;
use ytplay::{Cli, Error, Interrupt, Mpv, PlayMode, ProcessRunner, Renderer, Session, YtDlp};

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use tokio::io::BufReader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    info!("Starting ytplay v{}", ytplay::VERSION);

    let interrupt = Interrupt::install();
    let code = match run(cli.action(), interrupt).await {
        Ok(()) => 0,
        Err(err) => report(&err),
    };

    debug!("Exiting with status {}", code);
    // A prompt read may still be parked on stdin; exit without waiting for it.
    std::process::exit(code);
}

async fn run(action: Action, interrupt: Interrupt) -> Result<()> {
    require_tools(action.required_tools())?;

    let runner = ProcessRunner::new(interrupt.clone());
    let mut session = Session::new(
        YtDlp::new(runner.clone()),
        Mpv::new(runner),
        BufReader::new(tokio::io::stdin()),
        Renderer::stdout(),
        interrupt,
    );

    match action {
        Action::QuickSearch { query, limit, video } => {
            session.quick_search(&query, limit, PlayMode::from_video_flag(video)).await?
        }
        Action::Search { query, limit } => session.search(&query, limit).await?,
        Action::Play { target, video, by_search } => {
            session.play(&target, PlayMode::from_video_flag(video), by_search).await?
        }
        Action::Interactive => session.interactive().await?,
    }
    Ok(())
}

/// Print the failure and pick the exit status
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(Error::Interrupted) => {
            println!("\nBye.");
            0
        }
        Some(e @ Error::CommandFailed { stderr, .. }) => {
            eprintln!("{}", e);
            if !stderr.is_empty() {
                eprintln!("{}", stderr);
            }
            e.exit_code()
        }
        Some(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
        None => {
            eprintln!("Error: {:#}", err);
            1
        }
    }
}
