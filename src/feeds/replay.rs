use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::events::{Event, Log};

/// Spawns a task that reads an event log file and sends one Log event per
/// line, then Shutdown. A read or decode failure is sent as a Fault instead.
///
/// Sequence numbers are 1-based line numbers, blank lines included, so they
/// stay stable across restarts on the same file.
pub fn spawn(path: PathBuf, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match replay(&path, &tx).await {
            Ok(sent) => {
                info!(path = %path.display(), sent, "event log exhausted");
                let _ = tx.send(Event::Shutdown).await;
            }
            Err(e) => {
                let _ = tx
                    .send(Event::Fault {
                        reason: e.to_string(),
                    })
                    .await;
            }
        }
    })
}

async fn replay(path: &Path, tx: &mpsc::Sender<Event>) -> Result<u64> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    info!(path = %path.display(), "replaying event log");

    let mut seq = 0u64;
    let mut sent = 0u64;
    while let Some(line) = lines.next_line().await? {
        seq += 1;
        let Some(log) = parse_line(seq, &line)? else {
            continue;
        };

        if tx.send(Event::Log { seq, log }).await.is_err() {
            debug!(seq, "receiver dropped, stopping replay");
            break;
        }
        sent += 1;
    }
    Ok(sent)
}

/// Decode one line of the event log. Blank lines yield None.
pub fn parse_line(seq: u64, line: &str) -> Result<Option<Log>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| Error::Decode {
            line: seq,
            reason: e.to_string(),
        })
}
