//! Client errors

use thiserror::Error;
use triviacore::ProtocolError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input closed before login completed")]
    InputClosed,
}

impl ClientError {
    /// Whether the server went away
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ClientError::Protocol(e) if e.is_disconnect())
    }
}
