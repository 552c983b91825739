//! Brush state for a single stroke.

use glam::Vec3;
use sculpting_config::SculptParams;

use crate::spatial::Sphere;

/// Linear falloff: 1 at the brush center, 0 at the edge and beyond.
#[inline]
pub fn linear_falloff(distance: f32, radius: f32) -> f32 {
    (1.0 - distance / radius).max(0.0)
}

/// Everything one stroke needs to know about the brush, in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushState {
    /// Brush center (the pick point)
    pub center: Vec3,
    /// Influence radius, always > 0
    pub radius: f32,
    /// Unit displacement direction (the surface normal at the pick point)
    pub direction: Vec3,
    /// Displacement at full weight, always >= 0
    pub intensity: f32,
}

impl BrushState {
    /// Build a brush from a placement and the current parameters.
    ///
    /// Radius and intensity are clamped to their valid ranges and the
    /// direction is normalized (zero if degenerate).
    pub fn new(center: Vec3, direction: Vec3, params: &SculptParams) -> Self {
        Self {
            center,
            radius: params.clamped_radius(),
            direction: direction.normalize_or_zero(),
            intensity: params.clamped_intensity(),
        }
    }

    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.radius)
    }

    /// Falloff weight for a point at `distance` from the center.
    #[inline]
    pub fn weight(&self, distance: f32) -> f32 {
        linear_falloff(distance, self.radius)
    }

    /// Offset applied to a vertex with the given weight.
    #[inline]
    pub fn offset(&self, weight: f32) -> Vec3 {
        self.direction * (weight * self.intensity)
    }
}
