//! Transform component and heading helpers.

use glam::{Quat, Vec3};

/// World-space pose of a body: position and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }
}

/// Horizontal (XZ-plane) forward and right axes of an orientation.
///
/// Pitch and roll are discarded. When the forward axis points straight up or down
/// the world axes are returned instead so callers always get an orthonormal pair.
pub fn heading_axes(rotation: Quat) -> (Vec3, Vec3) {
    let forward = rotation * -Vec3::Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    match flat.try_normalize() {
        Some(forward) => (forward, Vec3::new(-forward.z, 0.0, forward.x)),
        None => (-Vec3::Z, Vec3::X),
    }
}
