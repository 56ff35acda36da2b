//! Console command definitions and execution

use anyhow::{Result, bail};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::registry::{CloseReason, Registry};

/// Console commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stop admitting players and start the game
    Done,

    /// List players logged in so far
    Status,

    /// Show help
    Help,
}

impl Command {
    /// Parse a command from operator input (case-insensitive)
    pub fn parse(input: &str) -> Result<Self> {
        let word = input.trim().to_lowercase();

        match word.as_str() {
            "" => bail!("Empty command"),
            "done" => Ok(Command::Done),
            "status" | "list" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            other => bail!("Unknown command: {}", other),
        }
    }
}

/// Execute a console command against the registry
pub async fn execute_command<S>(cmd: Command, registry: &Registry<S>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match cmd {
        Command::Done => {
            if registry.close_admission(CloseReason::OperatorStop) {
                println!("Admission closed with {} players", registry.len().await);
            } else {
                println!("Admission was already closed");
            }
        }

        Command::Status => {
            let names = registry.usernames().await;
            println!(
                "{}/{} players logged in",
                names.len(),
                registry.max_players()
            );
            for name in names {
                println!("  {}", name);
            }
        }

        Command::Help => {
            println!("Available commands:");
            println!("  done    - stop admitting players and start the game");
            println!("  status  - list players logged in so far");
            println!("  help    - show this help");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Command::parse("done").unwrap(), Command::Done);
        assert_eq!(Command::parse("Done").unwrap(), Command::Done);
        assert_eq!(Command::parse("  DONE \n").unwrap(), Command::Done);
        assert_eq!(Command::parse("status").unwrap(), Command::Status);
        assert_eq!(Command::parse("?").unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("start now").is_err());
    }

    #[tokio::test]
    async fn test_done_closes_admission_once() {
        let registry = Registry::<DuplexStream>::new(4);

        execute_command(Command::Done, &registry).await.unwrap();
        assert!(!registry.is_open());
        assert_eq!(registry.close_reason(), Some(CloseReason::OperatorStop));

        // Second `done` is harmless
        execute_command(Command::Done, &registry).await.unwrap();
    }
}
