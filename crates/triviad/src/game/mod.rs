//! Round orchestrator
//!
//! Once admission closes the game owns every player connection outright, so
//! nothing here needs a lock. One task walks the phases:
//!
//! `WaitingForPlayers → Started → (QuestionOpen → QuestionClosed) × rounds → Ended`
//!
//! A player whose connection fails is removed on the spot; the rest carry on.

mod scores;

pub use scores::ScoreTable;

use crate::questions::QuestionBank;
use crate::registry::Player;
use futures::future::join_all;
use futures::FutureExt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use triviacore::{Connection, Message, MessageType, ProtocolError};

/// Timing and round limits
#[derive(Debug, Clone)]
pub struct GameSettings {
    /// How long a question stays open
    pub round_time: Duration,
    /// How long to wait for each answer after END_QUESTION
    pub answer_timeout: Duration,
    pub max_rounds: usize,
    /// Announced to players; does not end the game early
    pub max_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    WaitingForPlayers,
    Started,
    QuestionOpen { round: usize },
    QuestionClosed { round: usize },
    Ended,
}

/// What happened, for the caller and for tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub rounds_played: usize,
    /// Every roster member in admission order, including dropped players
    pub standings: Vec<(String, u32)>,
    /// Players removed after a connection failure
    pub dropped: Vec<String>,
}

pub struct Game<S = TcpStream> {
    players: Vec<Player<S>>,
    questions: QuestionBank,
    settings: GameSettings,
    scores: ScoreTable,
    phase: GamePhase,
    dropped: Vec<String>,
}

impl<S> Game<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(players: Vec<Player<S>>, questions: QuestionBank, settings: GameSettings) -> Self {
        let scores = ScoreTable::new(players.iter().map(|p| p.username.clone()));
        Self {
            players,
            questions,
            settings,
            scores,
            phase: GamePhase::WaitingForPlayers,
            dropped: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn scores(&self) -> &ScoreTable {
        &self.scores
    }

    /// Play every round, broadcast the results and release all connections
    pub async fn run(mut self) -> GameSummary {
        let mut rounds_played = 0;

        if self.players.is_empty() {
            tracing::warn!("No players logged in; nothing to play");
            self.enter(GamePhase::Ended);
            return self.finish(rounds_played);
        }

        self.enter(GamePhase::Started);
        let banner = format!(
            "Server: Starting Game... {} rounds, {} players, max points {}",
            self.settings.max_rounds,
            self.players.len(),
            self.settings.max_points
        );
        self.broadcast(Message::start(banner)).await;

        for round in 0..self.settings.max_rounds {
            if self.players.is_empty() {
                tracing::warn!(
                    "Every player has left; stopping after {} rounds",
                    rounds_played
                );
                break;
            }
            let Some(question) = self.questions.get(round).cloned() else {
                tracing::error!("No question for round {}; stopping", round);
                break;
            };

            self.enter(GamePhase::QuestionOpen { round });
            self.broadcast(Message::question(question.format())).await;

            tokio::time::sleep(self.settings.round_time).await;

            self.discard_stale_messages();
            self.enter(GamePhase::QuestionClosed { round });
            self.broadcast(Message::end_question()).await;

            let answers = self.collect_answers().await;
            for (player, answer) in self.players.iter().zip(&answers) {
                match answer {
                    Ok(Some(submitted)) if question.is_correct(submitted) => {
                        let score = self.scores.award(&player.username).unwrap_or_default();
                        tracing::info!(
                            "{} answered {} correctly (score {})",
                            player.username,
                            submitted,
                            score
                        );
                    }
                    Ok(Some(submitted)) => {
                        tracing::info!("{} answered {} (wrong)", player.username, submitted);
                    }
                    Ok(None) => {
                        tracing::info!("{} did not answer in time", player.username);
                    }
                    Err(_) => {}
                }
            }
            self.drop_failed(answers);

            rounds_played += 1;
        }

        self.enter(GamePhase::Ended);
        let results = self.scores.render();
        tracing::info!("Final scores:\n{}", results.trim_end());
        self.broadcast(Message::end(results)).await;

        self.finish(rounds_played)
    }

    fn enter(&mut self, phase: GamePhase) {
        tracing::info!("Game phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn finish(mut self, rounds_played: usize) -> GameSummary {
        // Dropping the players closes their connections
        self.players.clear();
        GameSummary {
            rounds_played,
            standings: self.scores.standings().to_vec(),
            dropped: self.dropped,
        }
    }

    /// Send one message to every player concurrently
    async fn broadcast(&mut self, message: Message) {
        let sends = self.players.iter_mut().map(|player| {
            let message = message.clone();
            async move { player.connection.send(message).await }
        });
        let results = join_all(sends).await;
        self.drop_failed(results);
    }

    /// Wait for one ANSWER from every player, bounded by the answer timeout
    ///
    /// `Ok(None)` means the player stayed silent; that counts as wrong but
    /// keeps them in the game.
    async fn collect_answers(&mut self) -> Vec<Result<Option<String>, ProtocolError>> {
        let deadline = self.settings.answer_timeout;
        let gathers = self.players.iter_mut().map(|player| async move {
            match tokio::time::timeout(deadline, next_answer(&mut player.connection)).await {
                Ok(Ok(answer)) => Ok(Some(answer)),
                Ok(Err(e)) => Err(e),
                Err(_) => Ok(None),
            }
        });
        join_all(gathers).await
    }

    /// Throw away anything already buffered before a round closes
    ///
    /// A player who missed the previous deadline may still deliver that
    /// answer late; it must not count for this round.
    fn discard_stale_messages(&mut self) {
        let mut results = Vec::with_capacity(self.players.len());
        for player in &mut self.players {
            let mut result = Ok(());
            while let Some(received) = player.connection.receive().now_or_never() {
                match received {
                    Ok(message) => {
                        tracing::debug!(
                            "Discarding stale {:?} from {}",
                            message.kind,
                            player.username
                        );
                    }
                    Err(e) => {
                        result = Err(e);
                        break;
                    }
                }
            }
            results.push(result);
        }
        self.drop_failed(results);
    }

    /// Remove every player whose paired result is an error
    fn drop_failed<T>(&mut self, results: Vec<Result<T, ProtocolError>>) {
        let mut results = results.into_iter();
        let mut dropped = Vec::new();

        self.players.retain(|player| match results.next() {
            Some(Err(e)) => {
                if e.is_disconnect() {
                    tracing::warn!("{} disconnected; removing from the game", player.username);
                } else {
                    tracing::warn!("{} failed ({}); removing from the game", player.username, e);
                }
                dropped.push(player.username.clone());
                false
            }
            _ => true,
        });

        self.dropped.extend(dropped);
    }
}

/// Read until an ANSWER arrives, skipping anything else
async fn next_answer<S>(connection: &mut Connection<S>) -> Result<String, ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let message = connection.receive().await?;
        if message.kind == MessageType::Answer {
            return Ok(message.body);
        }
        tracing::debug!(
            "Ignoring {:?} from {} while collecting answers",
            message.kind,
            connection.peer()
        );
    }
}
