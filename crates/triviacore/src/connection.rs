//! Framed connection to a single peer

use crate::codec::MessageCodec;
use crate::error::{ProtocolError, Result};
use crate::protocol::Message;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

/// An open duplex stream plus the username bound to it once login succeeds
///
/// Generic over the stream so tests can run over `tokio::io::duplex`.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    framed: Framed<S, MessageCodec>,
    username: Option<String>,
    peer: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a stream with the message codec
    pub fn new(stream: S) -> Self {
        Self::with_peer(stream, "unknown")
    }

    /// Wrap a stream, remembering a printable peer label for logs
    pub fn with_peer(stream: S, peer: impl Into<String>) -> Self {
        Self {
            framed: Framed::new(stream, MessageCodec::new()),
            username: None,
            peer: peer.into(),
        }
    }

    /// Send one message, writing the whole frame
    ///
    /// Partial writes are completed; a failed write is returned as-is.
    pub async fn send(&mut self, message: Message) -> Result<()> {
        tracing::trace!("-> {} {:?}", self.peer, message.kind);
        self.framed.send(message).await
    }

    /// Wait for the next complete frame
    ///
    /// A peer that hangs up, cleanly or mid-frame, yields
    /// `ProtocolError::ConnectionClosed`.
    pub async fn receive(&mut self) -> Result<Message> {
        match self.framed.next().await {
            Some(Ok(message)) => {
                tracing::trace!("<- {} {:?}", self.peer, message.kind);
                Ok(message)
            }
            Some(Err(e)) => Err(e),
            None => Err(ProtocolError::ConnectionClosed),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

impl Connection<TcpStream> {
    /// Wrap an accepted or connected TCP stream, labelling it with its peer address
    pub fn from_tcp(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self::with_peer(stream, peer)
    }
}
