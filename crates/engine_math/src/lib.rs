//! # engine_math
//!
//! Math types for the engine. Re-exports [`glam`] for linear algebra and
//! defines the spatial types that implement
//! [`Component`](engine_component::Component).

pub mod rigid_body;
pub mod transform;

// Re-export glam types for convenience.
pub use glam::{Affine2, Vec2};

pub use rigid_body::RigidBody;
pub use transform::Transform2D;
