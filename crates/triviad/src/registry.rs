//! Connection registry shared by the login workers
//!
//! The username map and the ordered roster live behind one lock. The close
//! reason is set at most once and never waits on that lock, so a peer that
//! stalls during login cannot hold up the operator. Closing also cancels a
//! token so that parked login workers and the accept loop wake up.

use std::collections::HashMap;
use std::io;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use triviacore::{Connection, Message, ProtocolError, Result};

/// How long a client gets to take LOGIN_ACCEPTED off the wire
pub const LOGIN_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection that completed login
#[derive(Debug)]
pub struct Player<S = TcpStream> {
    pub username: String,
    pub connection: Connection<S>,
}

/// Why admission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Operator typed `done`
    OperatorStop,
    /// Roster reached max players
    RosterFull,
}

/// Reasons a login attempt is refused
///
/// The display text is sent verbatim as the LOGIN_DENIED body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Server: login denied, name in use")]
    NameInUse,

    #[error("Server: username must not be empty")]
    EmptyName,

    #[error("Server: game is full")]
    GameFull,

    #[error("Server: admission is closed")]
    Closed,
}

impl AdmissionError {
    /// Whether the client may try again on the same connection
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdmissionError::NameInUse | AdmissionError::EmptyName)
    }
}

/// Result of one login attempt
#[derive(Debug)]
pub enum LoginOutcome<S> {
    /// LOGIN_ACCEPTED was sent and the player joined the roster
    Accepted,
    /// LOGIN_DENIED was sent; the connection goes back to the worker
    Retry(Connection<S>, AdmissionError),
    /// The connection was dropped
    Rejected(AdmissionError),
}

struct RegistryInner<S> {
    /// Username to roster position
    names: HashMap<String, usize>,
    roster: Vec<Player<S>>,
}

pub struct Registry<S = TcpStream> {
    inner: Mutex<RegistryInner<S>>,
    close_reason: OnceLock<CloseReason>,
    closing: CancellationToken,
    max_players: usize,
    reply_timeout: Duration,
}

impl<S> Registry<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(max_players: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                names: HashMap::new(),
                roster: Vec::new(),
            }),
            close_reason: OnceLock::new(),
            closing: CancellationToken::new(),
            max_players,
            reply_timeout: LOGIN_REPLY_TIMEOUT,
        }
    }

    /// Override how long LOGIN_ACCEPTED may take to send
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Try to register `username` for `connection`
    ///
    /// On success LOGIN_ACCEPTED is sent while the lock is held, so the
    /// player is only inserted once the client has been told. A send that
    /// fails or outlasts the reply timeout leaves the registry untouched, as
    /// does admission closing while the reply was in flight.
    pub async fn try_admit(
        &self,
        mut connection: Connection<S>,
        username: &str,
    ) -> Result<LoginOutcome<S>> {
        let username = username.trim();
        let mut inner = self.inner.lock().await;

        let refusal = match self.close_reason() {
            Some(CloseReason::RosterFull) => Some(AdmissionError::GameFull),
            Some(CloseReason::OperatorStop) => {
                return Ok(LoginOutcome::Rejected(AdmissionError::Closed));
            }
            None if username.is_empty() => Some(AdmissionError::EmptyName),
            None if inner.names.contains_key(username) => Some(AdmissionError::NameInUse),
            None => None,
        };

        if let Some(error) = refusal {
            // Denials don't touch shared state, so reply outside the lock
            drop(inner);
            tracing::info!(
                "{} denied login as {:?}: {}",
                connection.peer(),
                username,
                error
            );
            connection.send(Message::login_denied(error.to_string())).await?;

            return Ok(if error.is_retryable() {
                LoginOutcome::Retry(connection, error)
            } else {
                LoginOutcome::Rejected(error)
            });
        }

        tokio::time::timeout(
            self.reply_timeout,
            connection.send(Message::login_accepted()),
        )
        .await
        .map_err(|_| {
            ProtocolError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "client did not read LOGIN_ACCEPTED",
            ))
        })??;

        // Only the operator can close while we hold the lock
        if self.close_reason().is_some() {
            tracing::info!(
                "{} accepted as {:?} after admission closed; dropping",
                connection.peer(),
                username
            );
            return Ok(LoginOutcome::Rejected(AdmissionError::Closed));
        }

        connection.set_username(username);

        let position = inner.roster.len();
        inner.names.insert(username.to_string(), position);
        inner.roster.push(Player {
            username: username.to_string(),
            connection,
        });
        tracing::info!(
            "{} joined ({}/{} players)",
            username,
            inner.roster.len(),
            self.max_players
        );

        if inner.roster.len() >= self.max_players {
            self.close_admission(CloseReason::RosterFull);
        }

        Ok(LoginOutcome::Accepted)
    }

    /// Stop admitting players
    ///
    /// Never waits on the registry lock. Returns true only for the call that
    /// actually closed admission.
    pub fn close_admission(&self, reason: CloseReason) -> bool {
        if self.close_reason.set(reason).is_err() {
            return false;
        }
        self.closing.cancel();
        tracing::info!("Admission closed ({:?})", reason);
        true
    }

    pub fn is_open(&self) -> bool {
        self.close_reason.get().is_none()
    }

    /// Resolves once admission has closed
    pub async fn closed(&self) {
        self.closing.cancelled().await
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason.get().copied()
    }

    /// Logged-in usernames in admission order
    pub async fn usernames(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.roster.iter().map(|p| p.username.clone()).collect()
    }

    pub async fn contains(&self, username: &str) -> bool {
        self.inner.lock().await.names.contains_key(username)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.roster.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Hand the roster over to the game
    ///
    /// Closes admission first if it is still open.
    pub async fn take_roster(&self) -> Vec<Player<S>> {
        if self.close_admission(CloseReason::OperatorStop) {
            tracing::warn!("Roster taken while admission was open; closed it");
        }
        let mut inner = self.inner.lock().await;
        inner.names.clear();
        std::mem::take(&mut inner.roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::DuplexStream;
    use tokio::time::timeout;
    use triviacore::MessageType;

    /// Registry-side connection plus the client end
    fn pair() -> (Connection<DuplexStream>, Connection<DuplexStream>) {
        let (server, client) = tokio::io::duplex(4096);
        (Connection::new(server), Connection::new(client))
    }

    #[tokio::test]
    async fn test_admit_unique_name() {
        let registry = Registry::new(4);
        let (server, mut client) = pair();

        let outcome = registry.try_admit(server, "alice").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Accepted));
        assert_eq!(client.receive().await.unwrap().kind, MessageType::LoginAccepted);
        assert_eq!(registry.usernames().await, vec!["alice".to_string()]);
        assert!(registry.is_open());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_denied() {
        let registry = Registry::new(4);
        let (first, _first_client) = pair();
        registry.try_admit(first, "alice").await.unwrap();

        let (second, mut second_client) = pair();
        let outcome = registry.try_admit(second, "alice").await.unwrap();
        let second = match outcome {
            LoginOutcome::Retry(conn, AdmissionError::NameInUse) => conn,
            other => panic!("expected retry, got {:?}", other),
        };

        let reply = second_client.receive().await.unwrap();
        assert_eq!(reply.kind, MessageType::LoginDenied);
        assert_eq!(reply.body, "Server: login denied, name in use");

        // Same connection retries with a fresh name
        let outcome = registry.try_admit(second, "bob").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Accepted));
        assert_eq!(
            registry.usernames().await,
            vec!["alice".to_string(), "bob".to_string()]
        );
    }

    #[tokio::test]
    async fn test_blank_name_is_denied() {
        let registry = Registry::new(2);
        let (server, mut client) = pair();

        let outcome = registry.try_admit(server, "   ").await.unwrap();
        assert!(matches!(
            outcome,
            LoginOutcome::Retry(_, AdmissionError::EmptyName)
        ));
        assert_eq!(client.receive().await.unwrap().kind, MessageType::LoginDenied);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_full_roster_closes_admission() {
        let registry = Registry::new(1);
        let (server, _client) = pair();

        registry.try_admit(server, "solo").await.unwrap();
        assert!(!registry.is_open());
        assert_eq!(registry.close_reason(), Some(CloseReason::RosterFull));

        // Closing again loses the race
        assert!(!registry.close_admission(CloseReason::OperatorStop));
        assert_eq!(registry.close_reason(), Some(CloseReason::RosterFull));

        let (late, mut late_client) = pair();
        let outcome = registry.try_admit(late, "late").await.unwrap();
        assert!(matches!(
            outcome,
            LoginOutcome::Rejected(AdmissionError::GameFull)
        ));

        let reply = late_client.receive().await.unwrap();
        assert_eq!(reply.kind, MessageType::LoginDenied);
        assert_eq!(reply.body, "Server: game is full");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_after_operator_close_is_dropped() {
        let registry = Registry::new(4);
        assert!(registry.close_admission(CloseReason::OperatorStop));

        let (late, mut late_client) = pair();
        let outcome = registry.try_admit(late, "late").await.unwrap();
        assert!(matches!(
            outcome,
            LoginOutcome::Rejected(AdmissionError::Closed)
        ));

        // No reply, just a closed connection
        assert!(late_client.receive().await.unwrap_err().is_disconnect());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_operator_close_wakes_waiters() {
        let registry = Arc::new(Registry::<DuplexStream>::new(4));

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.closed().await })
        };

        assert!(registry.close_admission(CloseReason::OperatorStop));
        waiter.await.unwrap();
        assert_eq!(registry.close_reason(), Some(CloseReason::OperatorStop));
    }

    #[tokio::test]
    async fn test_failed_accept_send_is_not_admitted() {
        let registry = Registry::new(4);
        let (server, client) = pair();
        drop(client);

        assert!(registry.try_admit(server, "ghost").await.is_err());
        assert!(!registry.contains("ghost").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_client_does_not_block_close() {
        let registry = Arc::new(Registry::<DuplexStream>::new(4));
        // Smaller than one frame, and nobody reads the other end
        let (server, _client) = tokio::io::duplex(64);

        let stalled = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.try_admit(Connection::new(server), "stuck").await })
        };
        tokio::task::yield_now().await;

        assert!(registry.close_admission(CloseReason::OperatorStop));
        timeout(Duration::from_secs(1), registry.closed())
            .await
            .expect("close waited on a stalled login");

        let outcome = stalled.await.unwrap();
        assert!(!matches!(outcome, Ok(LoginOutcome::Accepted)));
        assert!(registry.take_roster().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_accept_times_out() {
        let registry = Registry::<DuplexStream>::new(4)
            .with_reply_timeout(Duration::from_secs(2));
        let (server, _client) = tokio::io::duplex(64);

        let err = registry
            .try_admit(Connection::new(server), "stuck")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Io(ref e) if e.kind() == io::ErrorKind::TimedOut
        ));
        assert!(!registry.contains("stuck").await);
        assert!(registry.is_open());
    }

    #[tokio::test]
    async fn test_close_during_accept_reply_admits_nobody() {
        let registry = Arc::new(Registry::<DuplexStream>::new(4));
        let (server, client) = tokio::io::duplex(64);
        let mut client = Connection::new(client);

        let admitting = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.try_admit(Connection::new(server), "late").await })
        };
        tokio::task::yield_now().await;
        registry.close_admission(CloseReason::OperatorStop);

        // Reading lets a pending reply finish
        let _ = client.receive().await;

        let outcome = admitting.await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            LoginOutcome::Rejected(AdmissionError::Closed)
        ));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_take_roster_keeps_order() {
        let registry = Registry::new(3);
        let mut clients = Vec::new();
        for name in ["c", "a", "b"] {
            let (server, client) = pair();
            clients.push(client);
            registry.try_admit(server, name).await.unwrap();
        }

        let roster = registry.take_roster().await;
        let names: Vec<_> = roster.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(roster[0].connection.username(), Some("c"));
        assert!(registry.is_empty().await);
    }
}
