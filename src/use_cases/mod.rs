// Use cases layer: running a world on a fixed-rate loop.

pub mod handle;
pub mod types;
pub mod world_loop;

pub use handle::{LoopHandle, LoopSettings, spawn_world};
pub use types::{LoopError, WorldCommand};
pub use world_loop::world_task;
