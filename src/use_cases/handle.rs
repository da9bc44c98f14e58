// Spawning and addressing a running world loop.

use super::types::{LoopError, WorldCommand};
use super::world_loop::world_task;
use crate::domain::{World, WorldSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::task::JoinHandle;

/// Settings for spawning a world loop.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Capacity for queued world commands.
    pub command_channel_capacity: usize,
    /// Capacity for broadcast snapshots.
    pub snapshot_channel_capacity: usize,
    /// Fixed interval between simulation steps.
    pub tick_interval: Duration,
    /// Stop after this many steps (0 runs until shutdown).
    pub max_ticks: u64,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            command_channel_capacity: 1024,
            snapshot_channel_capacity: 128,
            tick_interval: Duration::from_millis(1000 / 60),
            max_ticks: 0,
        }
    }
}

/// Channels into and out of a running world loop.
#[derive(Clone)]
pub struct LoopHandle {
    /// Sender for commands applied before the next step.
    pub command_tx: mpsc::Sender<WorldCommand>,
    /// Broadcast sender for per-tick snapshots.
    pub snapshot_tx: broadcast::Sender<WorldSnapshot>,
    shutdown: Arc<Notify>,
}

impl LoopHandle {
    /// Receives every snapshot broadcast after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Queues a mutation to run on the loop task before the next step.
    pub async fn send(
        &self,
        command: impl FnOnce(&mut World) + Send + 'static,
    ) -> Result<(), LoopError> {
        self.command_tx
            .send(Box::new(command))
            .await
            .map_err(|_| LoopError::Closed)
    }

    /// Asks the loop to stop after its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Spawns the world loop on the current tokio runtime.
///
/// The join handle yields the world back once the loop stops.
pub fn spawn_world(world: World, settings: &LoopSettings) -> (LoopHandle, JoinHandle<World>) {
    let (command_tx, command_rx) =
        mpsc::channel::<WorldCommand>(settings.command_channel_capacity.max(1));
    let (snapshot_tx, _snapshot_rx) =
        broadcast::channel::<WorldSnapshot>(settings.snapshot_channel_capacity.max(1));
    let shutdown = Arc::new(Notify::new());

    let task = tokio::spawn(world_task(
        world,
        command_rx,
        snapshot_tx.clone(),
        settings.tick_interval,
        shutdown.clone(),
        settings.max_ticks,
    ));

    let handle = LoopHandle {
        command_tx,
        snapshot_tx,
        shutdown,
    };
    (handle, task)
}
