// Framework bootstrap for the headless world runtime.

use crate::domain::World;
use crate::frameworks::{config, demo};
use crate::interface_adapters::relay::spawn_snapshot_serializer;
use crate::use_cases::{LoopSettings, spawn_world};
use std::io::{self, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, trace};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Runs `world` on its loop until the tick limit or Ctrl-C, then hands it back.
pub async fn run(world: World, settings: LoopSettings) -> Result<World> {
    let (handle, mut task) = spawn_world(world, &settings);
    tokio::spawn(trace_frames(spawn_snapshot_serializer(&handle)));

    tokio::select! {
        joined = &mut task => return joined.map_err(io::Error::other),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("ctrl-c received; stopping world loop");
            handle.shutdown();
        }
    }

    task.await.map_err(io::Error::other)
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = config::loop_settings();
    let mut world = World::new(config::runtime_config());
    demo::populate(&mut world).map_err(io::Error::other)?;

    let world = run(world, settings).await?;
    info!(
        tick = world.tick(),
        entities = world.len(),
        "world loop finished"
    );
    Ok(())
}

async fn trace_frames(mut frames: watch::Receiver<Arc<str>>) {
    while frames.changed().await.is_ok() {
        let bytes = frames.borrow_and_update().len();
        trace!(bytes, "world update encoded");
    }
}
