//! Setup errors
//!
//! Anything that goes wrong before the first connection is accepted is fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not read question file {path}: {source}")]
    QuestionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed question file {path}: {source}")]
    QuestionFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("Question bank has {available} questions but {required} rounds were requested")]
    NotEnoughQuestions { available: usize, required: usize },
}
