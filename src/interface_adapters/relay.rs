// Serializes broadcast snapshots once for every downstream consumer.

use super::protocol::encode_update;
use crate::domain::WorldSnapshot;
use crate::use_cases::LoopHandle;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{error, warn};

/// Encodes each snapshot and publishes the latest JSON frame.
///
/// Consumers that fall behind only ever need the newest frame, so a watch
/// channel holds it. Lagging on the snapshot broadcast skips ahead.
pub async fn snapshot_serializer(
    mut snapshot_rx: broadcast::Receiver<WorldSnapshot>,
    latest_tx: watch::Sender<Arc<str>>,
) {
    loop {
        match snapshot_rx.recv().await {
            Ok(snapshot) => {
                let text = match encode_update(&snapshot) {
                    Ok(text) => text,
                    Err(e) => {
                        error!(error = ?e, tick = snapshot.tick, "failed to serialize world update");
                        continue;
                    }
                };
                let _ = latest_tx.send(Arc::from(text));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "snapshot serializer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("snapshot channel closed; serializer exiting");
                break;
            }
        }
    }
}

/// Spawns a serializer for the loop and returns the receiver of encoded frames.
pub fn spawn_snapshot_serializer(handle: &LoopHandle) -> watch::Receiver<Arc<str>> {
    let (latest_tx, latest_rx) = watch::channel::<Arc<str>>(Arc::from(""));
    tokio::spawn(snapshot_serializer(handle.subscribe(), latest_tx));
    latest_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn when_snapshot_arrives_then_latest_frame_is_published() {
        let (snapshot_tx, snapshot_rx) = broadcast::channel(4);
        let (latest_tx, mut latest_rx) = watch::channel::<Arc<str>>(Arc::from(""));
        let task = tokio::spawn(snapshot_serializer(snapshot_rx, latest_tx));

        snapshot_tx
            .send(WorldSnapshot {
                tick: 7,
                entities: Vec::new(),
            })
            .expect("serializer subscribed");
        latest_rx.changed().await.expect("frame published");

        assert!(latest_rx.borrow().contains("\"tick\":7"));
        drop(snapshot_tx);
        task.await.expect("serializer exits when the channel closes");
    }
}
