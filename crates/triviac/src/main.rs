//! Trivia client (triviac)

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpStream;
use tracing_subscriber::EnvFilter;
use triviac::ClientSession;
use triviacore::{Connection, spawn_stdin_reader};

#[derive(Parser)]
#[command(name = "triviac")]
#[command(about = "Multiplayer trivia game client", long_about = None)]
#[command(version)]
struct Cli {
    /// Server port
    port: u16,

    /// Server address
    ip: String,

    /// Log level or filter directive
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    println!("Connecting to server at PORT: {}, IP: {}", cli.port, cli.ip);
    let stream = TcpStream::connect((cli.ip.as_str(), cli.port))
        .await
        .with_context(|| format!("Could not connect to {}:{}", cli.ip, cli.port))?;
    println!("Successfully connected!");

    let mut session = ClientSession::new(Connection::from_tcp(stream));
    match session.run(spawn_stdin_reader()).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_disconnect() => {
            eprintln!("Connection closed due to server ending");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
