//! triviac library interface
//!
//! The client runs two tasks: the session driver talks to the server, and
//! the input listener turns typed letters into the current answer. They
//! share nothing but an [`AnswerCell`].

pub mod answer;
pub mod error;
pub mod input;
pub mod session;

pub use answer::AnswerCell;
pub use error::ClientError;
pub use session::{ClientSession, SessionState};
