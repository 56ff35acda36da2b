//! Protocol definitions and structures

pub mod constants;
pub mod message;
pub mod types;

pub use constants::*;
pub use message::Message;
pub use types::MessageType;
