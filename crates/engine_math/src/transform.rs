//! 2D transform component.
//!
//! [`Transform2D`] places an entity in the plane: position, per-axis scale and
//! rotation in degrees.

use engine_component::Component;
use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// A 2D transform representing position, rotation, and scale.
///
/// Nearly every visible entity has a `Transform2D`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform2D {
    /// World-space position in pixels.
    pub position: Vec2,
    /// Per-axis scale factor.
    pub scale: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
}

impl Transform2D {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    /// Create a transform from all three parts.
    #[must_use]
    pub fn new(position: Vec2, scale: Vec2, rotation: f64) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// Create a new transform with the given position and default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Compute the affine model transform.
    #[must_use]
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            self.scale,
            (self.rotation as f32).to_radians(),
            self.position,
        )
    }

    /// Translate the transform by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec2) -> Self {
        self.position += offset;
        self
    }

    /// Rotate by `degrees`, wrapping into `[0, 360)`.
    #[must_use]
    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = (self.rotation + degrees).rem_euclid(360.0);
        self
    }

    /// Apply a uniform scale factor.
    #[must_use]
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform2D {
    fn type_name() -> &'static str {
        "Transform2D"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform2D::IDENTITY;
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(Transform2D::default(), t);
    }

    #[test]
    fn test_from_position() {
        let t = Transform2D::from_position(Vec2::new(10.0, 30.0));
        assert_eq!(t.position, Vec2::new(10.0, 30.0));
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn test_translated() {
        let t = Transform2D::IDENTITY.translated(Vec2::new(5.0, -1.0));
        assert_eq!(t.position, Vec2::new(5.0, -1.0));
    }

    #[test]
    fn test_rotation_wraps() {
        let t = Transform2D::IDENTITY.rotated(350.0).rotated(20.0);
        assert!((t.rotation - 10.0).abs() < 1e-9);
        let t = Transform2D::IDENTITY.rotated(-90.0);
        assert!((t.rotation - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_affine_identity() {
        assert_eq!(Transform2D::IDENTITY.to_affine(), Affine2::IDENTITY);
    }

    #[test]
    fn test_affine_applies_scale_then_translation() {
        let t = Transform2D::new(Vec2::new(1.0, 2.0), Vec2::splat(2.0), 0.0);
        let p = t.to_affine().transform_point2(Vec2::new(1.0, 1.0));
        assert_eq!(p, Vec2::new(3.0, 4.0));
    }
}
