//! Interactive question loop shared by both binaries

use crate::agent::Orchestrator;
use crate::config::ScoutConfig;
use crate::logging;
use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

/// Command-line options shared by both agents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (TOML); defaults to <config dir>/scout/config.toml
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load `.env`, configuration and logging
pub fn bootstrap(args: &Args) -> Result<ScoutConfig> {
    let env_file = dotenvy::dotenv().ok();

    let config = ScoutConfig::load_from_path(args.config.clone())
        .with_context(|| "Failed to load configuration")?;
    logging::init(&config.logging, args.verbose)?;

    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }
    debug!("Configuration: {:?}", config);
    Ok(config)
}

/// Text shown around the loop
#[derive(Debug, Clone)]
pub struct ReplStyle {
    pub banner: Vec<String>,
    pub prompt: String,
    pub farewell: String,
    /// Surround answers with blank lines
    pub pad_answers: bool,
}

impl ReplStyle {
    #[must_use]
    pub fn adventure() -> Self {
        Self {
            banner: [
                "Adventure Planning Agent",
                "========================",
                "Ask me to plan your next adventure! Include destination, dates, and preferred activities.",
                "Example: 'Plan a 5-day hiking trip to Patagonia from March 15-20, 2024'",
                "Type 'exit', 'quit', or 'q' to quit.",
                "",
            ]
            .map(String::from)
            .to_vec(),
            prompt: "Where would you like to adventure? ".to_string(),
            farewell: "Happy travels!".to_string(),
            pad_answers: true,
        }
    }

    #[must_use]
    pub fn investment() -> Self {
        Self {
            banner: Vec::new(),
            prompt: "How can I help you? ".to_string(),
            farewell: "Goodbye!".to_string(),
            pad_answers: false,
        }
    }
}

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.contains(&line.to_lowercase().as_str())
}

/// Lines of input; the channel closing means end of input
pub type Lines = mpsc::Receiver<io::Result<String>>;

/// Read stdin on a detached thread and forward each line. A pending read
/// there never holds up runtime shutdown.
pub fn stdin_lines() -> Result<Lines> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })
        .with_context(|| "Failed to spawn stdin reader")?;
    Ok(rx)
}

/// Run the REPL on stdin/stdout until exit, end of input or Ctrl-C
pub async fn run(orchestrator: &dyn Orchestrator, style: &ReplStyle) -> Result<()> {
    let stdout = tokio::io::stdout();
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_with(orchestrator, style, stdin_lines()?, stdout, interrupt).await
}

/// Core loop over a line channel and any writer; `interrupt` resolving ends
/// it at once, also while waiting for input or answering a question.
pub async fn run_with<W, I>(
    orchestrator: &dyn Orchestrator,
    style: &ReplStyle,
    mut input: Lines,
    mut output: W,
    interrupt: I,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
    I: Future<Output = ()>,
{
    let mut interrupt = std::pin::pin!(interrupt);

    for line in &style.banner {
        output.write_all(format!("{line}\n").as_bytes()).await?;
    }

    loop {
        output.write_all(style.prompt.as_bytes()).await?;
        output.flush().await?;

        let next = tokio::select! {
            next = input.recv() => next,
            () = &mut interrupt => {
                output.write_all(format!("\n{}\n", style.farewell).as_bytes()).await?;
                break;
            }
        };

        let Some(line) = next else {
            debug!("End of input");
            output.write_all(format!("\n{}\n", style.farewell).as_bytes()).await?;
            break;
        };
        let line = line.with_context(|| "Failed to read input")?;

        let question = line.trim_end_matches(['\r', '\n']);
        if is_exit(question) {
            output.write_all(format!("{}\n", style.farewell).as_bytes()).await?;
            break;
        }

        let outcome = tokio::select! {
            outcome = orchestrator.run(question) => outcome,
            () = &mut interrupt => {
                output.write_all(format!("\n{}\n", style.farewell).as_bytes()).await?;
                break;
            }
        };

        let text = match outcome {
            Ok(answer) if style.pad_answers => format!("\n{answer}\n\n"),
            Ok(answer) => format!("{answer}\n"),
            Err(e) => {
                error!("Question failed: {:#}", e);
                format!("An error occurred: {e:#}\n")
            }
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}
