//! Operator console for the admission phase

mod commands;

pub use commands::{Command, execute_command};

use crate::registry::Registry;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

/// Run the console until admission closes or input ends
pub async fn run_console<S>(
    registry: Arc<Registry<S>>,
    mut lines: mpsc::UnboundedReceiver<String>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    println!("\n=== Trivia Server Console ===");
    println!("Type 'done' to start the game, 'help' for more");
    println!();

    loop {
        tokio::select! {
            _ = registry.closed() => break,

            line = lines.recv() => {
                let Some(line) = line else {
                    tracing::debug!("Console input closed");
                    break;
                };

                if line.trim().is_empty() {
                    continue;
                }

                match Command::parse(&line) {
                    Ok(cmd) => {
                        if let Err(e) = execute_command(cmd, registry.as_ref()).await {
                            eprintln!("Error: {}", e);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        println!("Type 'help' for available commands");
                    }
                }
            }
        }
    }

    Ok(())
}
