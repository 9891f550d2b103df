//! Predictive anti-tunneling.
//!
//! Before anything else in the step, sweep a sphere along the velocity for the
//! prediction horizon. If it meets a wall (steeper than the slope limit) that the
//! body is closing on, redirect the velocity along the wall plane at the same speed
//! and push back along the wall normal in proportion to the closing speed.

use glam::Vec3;

use crate::backend::LocomotionBackend;
use crate::config::LocomotionConfig;
use crate::sensor::probe_forward;

/// Correction applied in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelingCorrection {
    pub normal: Vec3,
    pub distance: f32,
    /// Velocity along the normal before clipping (negative).
    pub closing_speed: f32,
    pub clipped_velocity: Vec3,
    /// Repulsion impulse along the normal.
    pub repulsion: Vec3,
}

/// Remove the component of `velocity` along `normal`.
pub fn clip_to_plane(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - normal * velocity.dot(normal)
}

/// Redirect `velocity` along the plane of `normal` without changing its speed.
///
/// A head-on velocity has no tangential direction left and clips to zero.
pub fn clip_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    let tangent = clip_to_plane(velocity, normal);
    if tangent.length_squared() <= 1e-8 {
        return Vec3::ZERO;
    }
    tangent.normalize() * velocity.length()
}

/// Whether a surface with this normal is a wall rather than a ramp.
pub fn is_wall(normal: Vec3, config: &LocomotionConfig) -> bool {
    normal.dot(Vec3::Y) < config.slope_limit_cos()
}

/// Run the guard against the body's current velocity.
pub fn guard<B: LocomotionBackend + ?Sized>(
    backend: &mut B,
    config: &LocomotionConfig,
) -> Option<TunnelingCorrection> {
    let velocity = backend.linear_velocity();
    if velocity.length() < config.tunneling_min_speed {
        return None;
    }

    let probe = probe_forward(
        &*backend,
        backend.bounds().center,
        velocity,
        config.prediction_time,
        config.prediction_radius,
        config.walkable_mask,
    )?;
    let hit = probe.hit?;
    if !is_wall(hit.normal, config) {
        return None;
    }

    let closing_speed = velocity.dot(hit.normal);
    if closing_speed >= 0.0 {
        return None;
    }

    let clipped_velocity = clip_velocity(velocity, hit.normal);
    let repulsion = hit.normal * (-closing_speed * config.wall_repulsion);
    backend.set_linear_velocity(clipped_velocity);
    backend.apply_impulse(repulsion);

    log::debug!(
        "tunneling guard: wall at {:.2} m, closing {:.2} m/s, clipped to {:?}",
        hit.distance,
        closing_speed,
        clipped_velocity
    );

    Some(TunnelingCorrection {
        normal: hit.normal,
        distance: hit.distance,
        closing_speed,
        clipped_velocity,
        repulsion,
    })
}
