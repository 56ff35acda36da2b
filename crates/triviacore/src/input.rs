//! Line input shared by the server console and the client

use std::io::BufRead;
use tokio::sync::mpsc;

/// Read stdin lines on a dedicated thread
///
/// A plain thread keeps a pending read from holding up runtime shutdown.
/// The channel closes at EOF.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || forward_lines(std::io::stdin().lock(), tx));

    rx
}

/// Send each line of `reader` until EOF, a read error, or the receiver goes away
fn forward_lines<R: BufRead>(reader: R, tx: mpsc::UnboundedSender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Error reading stdin: {}", e);
                break;
            }
        }
    }
}
