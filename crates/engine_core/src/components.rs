//! Common components used across the engine.

use glam::Vec3;

/// Axis-aligned world-space bounds of a body's collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Build bounds from min/max corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Distance from the center to the bottom face.
    pub fn half_height(&self) -> f32 {
        self.half_extents.y
    }

    /// World position of the bottom face center.
    pub fn bottom(&self) -> Vec3 {
        self.center - Vec3::Y * self.half_extents.y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::splat(0.5))
    }
}

/// Tag component for the player-driven agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Tag component for AI-driven hovering agents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverDrone;

/// Display name used in logs.
#[derive(Debug, Clone, Default)]
pub struct Name(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_from_min_max() {
        let b = Bounds::from_min_max(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(b.center, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(b.half_height(), 1.0);
        assert_eq!(b.bottom(), Vec3::ZERO);
    }
}
