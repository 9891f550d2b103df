//! Capabilities the solver needs from a physics engine.
//!
//! The solver never talks to a physics engine directly. A backend implements
//! [`SpatialQuery`] for probes and [`DynamicBody`] for reading and driving the
//! character's rigid body; anything implementing both is a [`LocomotionBackend`].

use engine_core::Bounds;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Bit mask selecting which surfaces a probe may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    pub const ALL: SurfaceMask = SurfaceMask(u32::MAX);
    pub const NONE: SurfaceMask = SurfaceMask(0);

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits != 0
    }
}

impl Default for SurfaceMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Nearest hit reported by a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Distance travelled along the probe direction.
    pub distance: f32,
    /// Unit surface normal at the hit point.
    pub normal: Vec3,
}

/// Read-only spatial probes against the world.
pub trait SpatialQuery {
    /// Cast a ray; `direction` is unit length.
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit>;

    /// Sweep a sphere of `radius`; `direction` is unit length.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit>;
}

/// Accessor for the character's dynamic rigid body.
///
/// Impulses and accelerations are applied when the backend next integrates;
/// they are not visible through [`DynamicBody::linear_velocity`] within the same step.
pub trait DynamicBody {
    fn linear_velocity(&self) -> Vec3;

    fn set_linear_velocity(&mut self, velocity: Vec3);

    /// World-space bounds of the body's collider.
    fn bounds(&self) -> Bounds;

    fn orientation(&self) -> Quat;

    /// Mass-independent instantaneous velocity change.
    fn apply_impulse(&mut self, delta_velocity: Vec3);

    /// Mass-independent continuous acceleration for the coming step.
    fn apply_acceleration(&mut self, acceleration: Vec3);

    /// Whether the physics engine applies its own gravity to the body.
    fn uses_gravity(&self) -> bool;

    fn set_uses_gravity(&mut self, enabled: bool);
}

/// A backend providing both capabilities.
pub trait LocomotionBackend: SpatialQuery + DynamicBody {}

impl<T: SpatialQuery + DynamicBody> LocomotionBackend for T {}
