//! Client session driver

use crate::answer::AnswerCell;
use crate::error::ClientError;
use crate::input::listen_for_answers;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use triviacore::{Connection, Message, MessageType};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Playing,
    Finished,
}

/// Drives one client connection from login to the final scores
pub struct ClientSession<S> {
    connection: Connection<S>,
    answer: Arc<AnswerCell>,
    state: SessionState,
    username: Option<String>,
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(connection: Connection<S>) -> Self {
        Self {
            connection,
            answer: Arc::new(AnswerCell::new()),
            state: SessionState::Unauthenticated,
            username: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Log in, play every round, and return the final results text
    ///
    /// `lines` supplies usernames first; once logged in it is handed to the
    /// answer listener task.
    pub async fn run(
        &mut self,
        mut lines: mpsc::UnboundedReceiver<String>,
    ) -> Result<String, ClientError> {
        self.login(&mut lines).await?;

        let listener = tokio::spawn(listen_for_answers(lines, self.answer.clone()));
        let result = self.play().await;

        listener.abort();
        let _ = listener.await;

        result
    }

    /// Offer usernames until the server accepts one
    async fn login(
        &mut self,
        lines: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<(), ClientError> {
        while self.state == SessionState::Unauthenticated {
            println!("Enter a username:");
            let username = loop {
                let line = lines.recv().await.ok_or(ClientError::InputClosed)?;
                let line = line.trim();
                if !line.is_empty() {
                    break line.to_string();
                }
            };

            self.connection.send(Message::login(username.as_str())).await?;

            loop {
                let reply = self.connection.receive().await?;
                match reply.kind {
                    MessageType::LoginAccepted => {
                        tracing::info!("Logged in as {}", username);
                        self.connection.set_username(username.as_str());
                        self.username = Some(username);
                        self.state = SessionState::Authenticated;
                        break;
                    }
                    MessageType::LoginDenied => {
                        println!("{}", reply.body);
                        break;
                    }
                    other => {
                        tracing::debug!("Ignoring {:?} while logging in", other);
                    }
                }
            }
        }

        println!("Logged in! Waiting for the game to start...");
        Ok(())
    }

    /// Main loop: show questions, submit on END_QUESTION, stop at END
    async fn play(&mut self) -> Result<String, ClientError> {
        self.state = SessionState::Playing;

        loop {
            let message = self.connection.receive().await?;
            match message.kind {
                MessageType::Start | MessageType::Question => {
                    println!("{}", message.body);
                }
                MessageType::EndQuestion => {
                    let letter = self.answer.get();
                    println!("Answers sent!");
                    tracing::debug!("Submitting {}", letter);
                    self.connection.send(Message::answer(letter.to_string())).await?;
                }
                MessageType::End => {
                    println!("Game Over!");
                    println!("{}", message.body);
                    self.state = SessionState::Finished;
                    return Ok(message.body);
                }
                other => {
                    tracing::debug!("Ignoring {:?}", other);
                }
            }
        }
    }
}
