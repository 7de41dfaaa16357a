//! semnav - semantic navigation of an HTML page from the terminal

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use semnav::{
    Announcer, CommandSpeech, Effects, HtmlDocument, LogReveal, NavConfig, NodeId, Router, Session,
    Silent, Speech,
};

#[derive(Parser)]
#[command(name = "semnav")]
#[command(version, about = "Navigate an HTML page by landmarks, headings, topics and responses", long_about = None)]
#[command(after_help = "Reads one command per line from stdin:
    next_heading, prev_heading, next_landmark, prev_landmark, jump_topics,
    next_response, prev_response, read_current, scope_current_response,
    clear_scope, body, toggle_speech
    {\"type\":\"PANEL_QUERY\"}       Control-panel JSON request
    :reload                       Re-read the page as a document change
    :status                       Print the panel status
    :quit                         Exit")]
struct Cli {
    /// HTML page to navigate
    #[arg(value_name = "PAGE")]
    page: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Never invoke the speech synthesizer
    #[arg(long)]
    no_speech: bool,

    /// Do not print the greeting
    #[arg(short, long)]
    quiet: bool,
}

/// Prints each announcement on its own line.
struct StdoutAnnouncer;

impl Announcer for StdoutAnnouncer {
    fn clear(&mut self) {}

    fn publish(&mut self, text: &str) {
        println!("{text}");
    }
}

const TAB: u32 = 0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("semnav=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> semnav::Result<()> {
    let mut config = match &cli.config {
        Some(path) => NavConfig::load(path)?,
        None => NavConfig::default(),
    };
    if cli.no_speech {
        config.speech.enabled = false;
    }

    let document = HtmlDocument::from_bytes(&fs::read(&cli.page)?);
    tracing::info!("Loaded {}", cli.page.display());

    // --no-speech only starts with the toggle off; toggleTTS can still turn it on.
    let speech: Box<dyn Speech> = match CommandSpeech::from_config(&config.speech) {
        Some(synthesizer) => Box::new(synthesizer),
        None => Box::new(Silent),
    };
    let effects: Effects<NodeId> =
        Effects::new(Box::new(LogReveal), Box::new(StdoutAnnouncer), speech);

    let mut session = Session::new(document, &config, effects)?;
    if !cli.quiet {
        session.start();
    }

    let mut router = Router::new();
    router.open(TAB, session);
    router.activate(TAB)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        match line {
            "" => {}
            ":quit" => break,
            ":reload" => reload(&mut router, &cli.page)?,
            ":status" => println!("{}", router.panel_json(r#"{"type":"PANEL_QUERY"}"#)),
            _ if line.starts_with('{') => println!("{}", router.panel_json(line)),
            name => router.command(name),
        }
    }
    Ok(())
}

fn reload(router: &mut Router<HtmlDocument>, page: &Path) -> semnav::Result<()> {
    let bytes = fs::read(page)?;
    if let Some(session) = router.active() {
        session.document_mut().replace_body_bytes(&bytes);
        tracing::info!("Reloaded {}", page.display());
    }
    Ok(())
}
