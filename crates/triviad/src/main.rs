//! Trivia Server Daemon (triviad)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use triviad::{Config, QuestionBank, Server};

#[derive(Parser)]
#[command(name = "triviad")]
#[command(about = "Multiplayer trivia game server", long_about = None)]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(required_unless_present = "config")]
    port: Option<u16>,

    /// Address to bind
    #[arg(required_unless_present = "config")]
    ip: Option<String>,

    /// Seconds each question stays open
    #[arg(required_unless_present = "config")]
    round_time: Option<u64>,

    /// Points announced to players
    #[arg(required_unless_present = "config")]
    max_points: Option<u32>,

    /// Number of rounds to play
    #[arg(required_unless_present = "config")]
    max_rounds: Option<usize>,

    /// Roster size that closes admission
    #[arg(required_unless_present = "config")]
    max_players: Option<usize>,

    /// Load settings from a JSON file instead of the positional arguments
    #[arg(
        short,
        long,
        conflicts_with_all = ["port", "ip", "round_time", "max_points", "max_rounds", "max_players"]
    )]
    config: Option<PathBuf>,

    /// Question bank (JSON)
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// Seconds to wait for each answer after a round closes (defaults to round time)
    #[arg(long)]
    answer_timeout: Option<u64>,

    /// Don't read operator commands from stdin
    #[arg(long)]
    no_console: bool,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Cli {
    /// Merge file settings or positional arguments with the flags
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let mut config = Config::default();
                config.server.port = self.port.context("missing port")?;
                config.server.address = self.ip.clone().context("missing ip")?;
                config.game.round_time_seconds = self.round_time.context("missing round_time")?;
                config.game.max_points = self.max_points.context("missing max_points")?;
                config.game.max_rounds = self.max_rounds.context("missing max_rounds")?;
                config.server.max_players = self.max_players.context("missing max_players")?;
                config
            }
        };

        if let Some(path) = self.questions {
            config.game.questions_path = path;
        }
        if self.answer_timeout.is_some() {
            config.game.answer_timeout_seconds = self.answer_timeout;
        }
        if self.no_console {
            config.server.console = false;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let write_config = cli.write_config.clone();
    let config = cli.into_config()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    if let Some(path) = write_config {
        config
            .save(&path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let questions = QuestionBank::load(&config.game.questions_path)?;
    let server = Server::new(config, questions).await?;
    let summary = server.run().await?;

    println!("Final scores:");
    for (name, score) in &summary.standings {
        println!("  {} : {}", name, score);
    }

    Ok(())
}
