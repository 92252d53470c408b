//! Host tick loop.
//!
//! Each tick:
//!
//! 1. Wait out the rest of the frame budget (when paced).
//! 2. Measure the elapsed time since the previous tick.
//! 3. Settle queued entity changes with [`Registry::update`].
//! 4. Run the demo systems with the measured delta.

use std::time::Instant;

use anyhow::Result;
use engine_component::Registry;
use engine_math::{RigidBody, Transform2D, Vec2};
use tracing::{debug, info, warn};

use crate::config::TickConfig;
use crate::systems::{MovementSystem, RenderSystem};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Tick counter after this tick.
    pub tick_id: u64,
    /// Seconds since the previous tick.
    pub delta_time: f64,
    /// Entities moved by the movement system.
    pub moved: usize,
    /// Entities the render stand-in would draw.
    pub drawn: usize,
}

/// The host loop state.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
    /// The ECS registry driven by this loop.
    registry: Registry,
    /// When the previous tick started.
    previous_frame: Option<Instant>,
}

impl TickLoop {
    /// Create a tick loop with the demo systems registered.
    pub fn new(config: TickConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = Registry::new();
        registry.add_system(MovementSystem::new())?;
        registry.add_system(RenderSystem::new())?;
        Ok(Self {
            tick_id: 0,
            config,
            registry,
            previous_frame: None,
        })
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns a mutable reference to the registry.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Spawn `count` moving entities spread along the x axis.
    pub fn setup(&mut self, count: u32) -> Result<()> {
        for i in 0..count {
            let entity = self.registry.create_entity();
            let offset = i as f32 * 50.0;
            self.registry.add_component(
                entity,
                Transform2D::new(Vec2::new(10.0 + offset, 30.0), Vec2::ONE, 0.0),
            )?;
            self.registry
                .add_component(entity, RigidBody::new(40.0, 10.0 * i as f32))?;
        }
        info!(entities = count, "scene set up");
        Ok(())
    }

    /// Run one tick with an externally measured `delta_time` in seconds.
    pub fn tick(&mut self, delta_time: f64) -> Result<TickReport> {
        self.tick_id += 1;

        let stats = self.registry.update();
        let moved = MovementSystem::update(&mut self.registry, delta_time)?;
        let drawn = RenderSystem::update(&self.registry)?;

        debug!(
            tick_id = self.tick_id,
            delta_time,
            evaluated = stats.evaluated,
            removed = stats.removed,
            moved,
            "tick complete"
        );

        Ok(TickReport {
            tick_id: self.tick_id,
            delta_time,
            moved,
            drawn,
        })
    }

    /// Sleep until the frame budget has passed, then return the seconds
    /// elapsed since the previous frame.
    fn wait_for_frame(&mut self) -> f64 {
        let budget = self.config.frame_budget();
        let now = match self.previous_frame {
            Some(previous) => {
                let elapsed = previous.elapsed();
                if self.config.paced {
                    if elapsed < budget {
                        std::thread::sleep(budget - elapsed);
                    } else if elapsed > budget {
                        warn!(
                            tick_id = self.tick_id,
                            elapsed_us = elapsed.as_micros() as u64,
                            budget_us = budget.as_micros() as u64,
                            "tick exceeded time budget"
                        );
                    }
                }
                Instant::now()
            }
            None => Instant::now(),
        };

        let delta_time = self
            .previous_frame
            .map_or(0.0, |previous| now.duration_since(previous).as_secs_f64());
        self.previous_frame = Some(now);
        delta_time
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    pub fn run(&mut self) -> Result<()> {
        info!(
            fps = self.config.fps,
            max_ticks = self.config.max_ticks,
            paced = self.config.paced,
            "starting tick loop"
        );

        loop {
            let delta_time = self.wait_for_frame();
            let report = self.tick(delta_time)?;
            if report.tick_id % u64::from(self.config.fps) == 0 {
                info!(
                    tick_id = report.tick_id,
                    delta_time = report.delta_time,
                    moved = report.moved,
                    drawn = report.drawn,
                    "heartbeat"
                );
            }

            if self.config.max_ticks > 0 && self.tick_id >= self.config.max_ticks {
                info!(ticks = self.tick_id, "tick loop complete");
                return Ok(());
            }
        }
    }
}
