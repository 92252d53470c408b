//! Linear motion component.

use engine_component::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Linear velocity of an entity, in pixels per second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RigidBody {
    /// Velocity in pixels per second.
    pub velocity: Vec2,
}

impl RigidBody {
    /// At rest.
    pub const ZERO: Self = Self {
        velocity: Vec2::ZERO,
    };

    /// Create a body moving at `(x, y)` pixels per second.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            velocity: Vec2::new(x, y),
        }
    }

    /// Displacement covered in `dt` seconds.
    #[must_use]
    pub fn displacement(&self, dt: f64) -> Vec2 {
        self.velocity * dt as f32
    }
}

impl Component for RigidBody {
    fn type_name() -> &'static str {
        "RigidBody"
    }
}
