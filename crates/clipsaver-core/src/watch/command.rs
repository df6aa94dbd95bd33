//! Commands sent to a running watcher.

use std::io::BufRead;
use std::thread::JoinHandle;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Out-of-band requests the loop handles at the top of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Zero the savings ledger.
    Reset,
}

impl Command {
    /// Parse one line of user input. Unknown input is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "reset" | "r" => Some(Command::Reset),
            _ => None,
        }
    }
}

/// Read commands line by line from `reader` on a dedicated thread.
///
/// The thread exits on EOF, on a read error, or once the receiving side is gone.
pub fn spawn_line_listener<R>(reader: R, tx: UnboundedSender<Command>) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("clipsaver-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Command input closed");
                        break;
                    }
                };

                match Command::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => debug!(input = %line.trim(), "Ignoring unknown command"),
                }
            }
        })
}
