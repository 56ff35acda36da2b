//! Server wiring: bind, admit players, run the game

use crate::Config;
use crate::admission::run_admission;
use crate::console;
use crate::error::SetupError;
use crate::game::{Game, GameSummary};
use crate::questions::QuestionBank;
use crate::registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub struct Server {
    config: Config,
    questions: QuestionBank,
    listener: TcpListener,
    registry: Arc<Registry>,
}

impl Server {
    /// Validate the setup and bind the listening socket
    ///
    /// Every failure here is fatal to the process.
    pub async fn new(config: Config, questions: QuestionBank) -> Result<Self, SetupError> {
        config.validate()?;
        questions.ensure_rounds(config.game.max_rounds)?;

        let addr = config.bind_address();
        tracing::info!("Initializing server at {}", addr);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| SetupError::Bind { addr, source })?;

        let registry = Arc::new(Registry::new(config.server.max_players));

        Ok(Self {
            config,
            questions,
            listener,
            registry,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared registry, e.g. for closing admission from outside
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Run one game using stdin as the operator console when enabled
    pub async fn run(self) -> anyhow::Result<GameSummary> {
        let lines = if self.config.server.console {
            Some(triviacore::spawn_stdin_reader())
        } else {
            None
        };
        self.run_with_console(lines).await
    }

    /// Run one game, reading operator commands from `lines` if given
    pub async fn run_with_console(
        self,
        lines: Option<mpsc::UnboundedReceiver<String>>,
    ) -> anyhow::Result<GameSummary> {
        let Self {
            config,
            questions,
            listener,
            registry,
        } = self;

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(
                "Server successfully started on {}, waiting for up to {} players",
                addr,
                config.server.max_players
            );
        }

        let console = lines.map(|lines| {
            tokio::spawn(console::run_console(registry.clone(), lines))
        });

        run_admission(listener, registry.clone()).await;

        if let Some(console) = console {
            match console.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Console error: {}", e),
                Err(e) => tracing::warn!("Console task failed: {}", e),
            }
        }

        let players = registry.take_roster().await;
        tracing::info!(
            "Starting game with {} players ({:?})",
            players.len(),
            registry.close_reason()
        );

        let summary = Game::new(players, questions, config.game_settings()).run().await;
        tracing::info!(
            "Game over after {} rounds ({} players dropped)",
            summary.rounds_played,
            summary.dropped.len()
        );

        Ok(summary)
    }
}
