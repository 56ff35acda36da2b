//! Admission phase: accept loop and per-connection login workers

use crate::registry::{LoginOutcome, Registry};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use triviacore::{Connection, MessageType};

/// Accept connections until admission closes, then wait for every login worker
///
/// Admission ends when the operator stops it or the roster fills up; both go
/// through the registry, so whichever happens first wins. The listener is
/// dropped on return.
pub async fn run_admission(listener: TcpListener, registry: Arc<Registry>) {
    let mut workers = JoinSet::new();

    loop {
        tokio::select! {
            _ = registry.closed() => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    tracing::info!("New connection from {}", addr);
                    let connection = Connection::with_peer(stream, addr.to_string());
                    workers.spawn(login_worker(registry.clone(), connection));
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            },

            Some(result) = workers.join_next(), if !workers.is_empty() => {
                if let Err(e) = result {
                    tracing::error!("Login worker failed: {}", e);
                }
            }
        }
    }

    drop(listener);

    let pending = workers.len();
    if pending > 0 {
        tracing::debug!("Waiting for {} login workers", pending);
    }
    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            tracing::error!("Login worker failed: {}", e);
        }
    }
}

/// Negotiate a unique username on one connection
///
/// Loops on LOGIN messages until the registry accepts one. Gives up on the
/// connection if admission closes first or the peer goes away.
pub async fn login_worker<S>(registry: Arc<Registry<S>>, mut connection: Connection<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let received = tokio::select! {
            biased;
            _ = registry.closed() => {
                tracing::info!(
                    "{} abandoned: admission closed before login",
                    connection.peer()
                );
                return;
            }
            received = connection.receive() => received,
        };

        let message = match received {
            Ok(message) => message,
            Err(e) if e.is_disconnect() => {
                tracing::info!("{} disconnected during login", connection.peer());
                return;
            }
            Err(e) => {
                tracing::warn!("Error reading login from {}: {}", connection.peer(), e);
                return;
            }
        };

        if message.kind != MessageType::Login {
            tracing::warn!(
                "{} sent {:?} before logging in; ignoring",
                connection.peer(),
                message.kind
            );
            continue;
        }

        tracing::debug!(
            "{} requested username {:?}",
            connection.peer(),
            message.body
        );
        let peer = connection.peer().to_string();

        connection = match registry.try_admit(connection, &message.body).await {
            Ok(LoginOutcome::Accepted) => return,
            Ok(LoginOutcome::Retry(connection, _)) => connection,
            Ok(LoginOutcome::Rejected(reason)) => {
                tracing::info!("{} dropped: {}", peer, reason);
                return;
            }
            Err(e) => {
                tracing::warn!("Login reply to {} failed: {}", peer, e);
                return;
            }
        };
    }
}
