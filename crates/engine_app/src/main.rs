//! # engine_app: host loop
//!
//! Headless driver for the ECS registry. It owns frame pacing and the
//! per-tick delta; the registry only ever sees that delta and the `update`
//! call. Rendering, input and asset loading are out of scope.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line into a [`config::TickConfig`].
//! 2. Register the demo systems and spawn the demo entities.
//! 3. Enter the fixed-rate tick loop.

mod config;
mod systems;
mod tick;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::TickConfig;
use tick::TickLoop;

#[derive(Debug, Parser)]
#[command(name = "engine_app", about = "Headless ECS host loop")]
struct Cli {
    /// Target frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Number of ticks to run (0 = run until interrupted).
    #[arg(long, default_value_t = 600)]
    max_ticks: u64,

    /// Number of demo entities to spawn.
    #[arg(long, default_value_t = 2)]
    entities: u32,

    /// Run ticks back to back instead of pacing to the frame rate.
    #[arg(long)]
    unpaced: bool,
}

impl Cli {
    fn tick_config(&self) -> TickConfig {
        TickConfig::new(self.fps, self.max_ticks).with_pacing(!self.unpaced)
    }
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!(?cli, "engine starting");

    let mut tick_loop = TickLoop::new(cli.tick_config())?;
    tick_loop.setup(cli.entities)?;
    tick_loop.run()?;

    info!(
        ticks = tick_loop.tick_id(),
        entities = tick_loop.registry().entity_count(),
        "engine shut down"
    );
    Ok(())
}
