//! triviad library interface

pub mod admission;
pub mod config;
pub mod console;
pub mod error;
pub mod game;
pub mod questions;
pub mod registry;
pub mod server;

pub use config::Config;
pub use error::SetupError;
pub use game::{GameSettings, GameSummary};
pub use questions::{Question, QuestionBank};
pub use registry::Registry;
pub use server::Server;
