//! # triviacore
//!
//! Core protocol library for the trivia server and client.
//!
//! This library provides the pieces both ends of a game share:
//!
//! - Protocol constants and the message type enumeration
//! - Encoding/decoding of fixed-layout frames (tokio-util codec)
//! - A framed `Connection` with blocking-style `send`/`receive`
//! - A stdin line reader for the interactive front ends
//!
//! ## Example
//!
//! ```rust,no_run
//! use triviacore::{Connection, Message, MessageType};
//! use tokio::net::TcpStream;
//!
//! # async fn demo() -> triviacore::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:5600").await?;
//! let mut connection = Connection::new(stream);
//!
//! connection.send(Message::login("alice")).await?;
//! let reply = connection.receive().await?;
//! assert_eq!(reply.kind, MessageType::LoginAccepted);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod connection;
pub mod error;
pub mod input;
pub mod protocol;

// Re-export commonly used types
pub use codec::MessageCodec;
pub use connection::Connection;
pub use error::{ProtocolError, Result};
pub use input::spawn_stdin_reader;
pub use protocol::{Message, MessageType};
