//! Demo gameplay systems driven by the host loop.
//!
//! The registry only decides which entities each system sees; the work done
//! per entity lives here.

use engine_component::{Registry, Result, System, SystemCore};
use engine_math::{RigidBody, Transform2D};
use tracing::{debug, trace};

/// Moves every entity with a [`Transform2D`] and a [`RigidBody`].
pub struct MovementSystem {
    core: SystemCore,
}

impl MovementSystem {
    pub fn new() -> Self {
        let mut core = SystemCore::new();
        core.require_component::<Transform2D>();
        core.require_component::<RigidBody>();
        Self { core }
    }

    /// Integrates `position += velocity * dt` for every member entity.
    ///
    /// Returns the number of entities moved.
    pub fn update(registry: &mut Registry, dt: f64) -> Result<usize> {
        let entities = registry.system_entities::<Self>()?;
        for &entity in &entities {
            let displacement = registry.get_component::<RigidBody>(entity)?.displacement(dt);
            let transform = registry.get_component_mut::<Transform2D>(entity)?;
            transform.position += displacement;
            trace!(entity = %entity, x = transform.position.x, y = transform.position.y, "moved");
        }
        Ok(entities.len())
    }
}

impl System for MovementSystem {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}

/// Stand-in for the renderer: reports what it would draw.
pub struct RenderSystem {
    core: SystemCore,
}

impl RenderSystem {
    pub fn new() -> Self {
        let mut core = SystemCore::new();
        core.require_component::<Transform2D>();
        Self { core }
    }

    /// Returns the number of entities that would be drawn this frame.
    pub fn update(registry: &Registry) -> Result<usize> {
        let system = registry.get_system::<Self>()?;
        let count = system.core().len();
        debug!(
            count,
            transforms = registry.component_count::<Transform2D>(),
            "render pass"
        );
        Ok(count)
    }
}

impl System for RenderSystem {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}
