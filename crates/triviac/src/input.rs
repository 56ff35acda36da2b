//! Answer listener fed by local input

use crate::answer::AnswerCell;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Keep the answer cell up to date with whatever the player types
///
/// Runs until the input channel closes.
pub async fn listen_for_answers(
    mut lines: mpsc::UnboundedReceiver<String>,
    answer: Arc<AnswerCell>,
) {
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        if answer.set(&line) {
            tracing::debug!("Current answer is now {}", answer.get());
        } else {
            println!("Answer must be a, b, c, or d");
        }
    }
    tracing::debug!("Input closed; answer stays {}", answer.get());
}
