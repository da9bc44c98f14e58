use super::types::WorldCommand;
use crate::domain::{World, WorldSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tracing::{debug, info};

/// Drives a world at a fixed rate until shutdown or until `max_ticks` steps ran.
///
/// Each iteration waits for the next interval tick, applies every queued
/// command in arrival order, advances the world one step and broadcasts the
/// resulting snapshot. A `max_ticks` of 0 means no bound. The world is handed
/// back when the loop ends.
pub async fn world_task(
    mut world: World,
    mut commands_rx: mpsc::Receiver<WorldCommand>,
    snapshot_tx: broadcast::Sender<WorldSnapshot>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
    max_ticks: u64,
) -> World {
    let mut interval = tokio::time::interval(tick_interval);
    info!(
        tick_interval_ms = tick_interval.as_millis() as u64,
        max_ticks, "world loop started"
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = world.tick(), "world loop shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        // Apply queued commands before stepping.
        let mut applied = 0usize;
        while let Ok(command) = commands_rx.try_recv() {
            command(&mut world);
            applied += 1;
        }

        // Advance the world one tick.
        let tick = world.step();
        if applied > 0 {
            debug!(tick, applied, "applied world commands");
        }

        // No subscribers is fine; snapshots are dropped until someone listens.
        let _ = snapshot_tx.send(world.snapshot());

        if max_ticks != 0 && tick >= max_ticks {
            info!(tick, "world loop reached its tick limit");
            break;
        }
    }

    world
}
