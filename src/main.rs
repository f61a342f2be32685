use std::path::Path;

use anyhow::anyhow;
use prediction_indexer::config::Config;
use prediction_indexer::events::Event;
use prediction_indexer::feeds::replay;
use prediction_indexer::{MemoryStore, Projector, Store};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "PREDICTION_INDEXER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let cfg = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(config = %config_path, "loaded config");

    let mut projector = Projector::new(open_store(&cfg)?);

    // Create the event channel
    let (tx, mut rx) = mpsc::channel::<Event>(cfg.source.channel_capacity);
    replay::spawn(cfg.source.events_path.clone(), tx.clone());

    // Ctrl+C stops after the event in flight
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Event::Shutdown).await;
        }
    });

    let mut halted = None;
    while let Some(event) = rx.recv().await {
        match event {
            Event::Log { seq, log } => {
                if let Err(e) = projector.process(seq, &log) {
                    error!(
                        seq,
                        block = log.block.number,
                        event = log.event.name(),
                        error = %e,
                        "halting projection"
                    );
                    halted = Some(anyhow::Error::new(e));
                    break;
                }
            }
            Event::Fault { reason } => {
                error!(%reason, "event feed failed");
                halted = Some(anyhow!(reason));
                break;
            }
            Event::Shutdown => {
                info!("shutting down");
                break;
            }
        }
    }

    let stats = projector.stats();
    info!(
        applied = stats.total_applied(),
        skipped = stats.skipped,
        claims_ignored = stats.claims_ignored,
        "projection stopped"
    );
    for (event, count) in &stats.applied {
        debug!(event, count, "applied");
    }

    // Written on halt too: the cursor points at the last good event
    let store = projector.into_store();
    let saved = write_snapshot(&store, &cfg.snapshot.path);
    exit_status(halted, saved)
}

/// The halt reason wins over a snapshot failure, which is only logged then.
fn exit_status(halted: Option<anyhow::Error>, saved: anyhow::Result<()>) -> anyhow::Result<()> {
    match (halted, saved) {
        (Some(e), Err(snapshot_err)) => {
            error!(error = %snapshot_err, "snapshot not written after halt");
            Err(e)
        }
        (Some(e), Ok(())) => Err(e),
        (None, saved) => saved,
    }
}

fn write_snapshot(store: &MemoryStore, path: &Path) -> anyhow::Result<()> {
    store.save_snapshot(path)?;
    info!(
        path = %path.display(),
        rounds = store.round_count(),
        users = store.user_count(),
        bets = store.bet_count(),
        "snapshot written"
    );
    Ok(())
}

fn open_store(cfg: &Config) -> anyhow::Result<MemoryStore> {
    let path = &cfg.snapshot.path;
    if !cfg.snapshot.resume || !path.exists() {
        return Ok(MemoryStore::new());
    }

    let store = MemoryStore::load_snapshot(path)?;
    info!(path = %path.display(), cursor = ?store.cursor()?, "resuming from snapshot");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_reason_survives_snapshot_failure() {
        let halted = Some(anyhow!("ordering violation: LockRound references round 7"));
        let saved = Err(anyhow!("permission denied"));

        let err = exit_status(halted, saved).unwrap_err();
        assert!(err.to_string().contains("LockRound references round 7"));
    }

    #[test]
    fn test_exit_status() {
        assert!(exit_status(None, Ok(())).is_ok());
        assert!(exit_status(None, Err(anyhow!("disk full"))).is_err());
        assert_eq!(
            exit_status(Some(anyhow!("feed closed")), Ok(())).unwrap_err().to_string(),
            "feed closed"
        );
    }
}
