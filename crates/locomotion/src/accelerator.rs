//! Quake-style acceleration, friction and jumping.
//!
//! Acceleration is proportional to the deficit between the wished speed and the
//! current speed along the wish direction, so it converges quickly from rest and
//! adds nothing once the body is at or above the wished speed.

use glam::Vec3;

use crate::backend::DynamicBody;
use crate::config::LocomotionConfig;
use crate::ground::GroundSample;
use crate::intent::MovementIntent;

/// Apply ground friction to the horizontal part of `velocity`.
pub fn apply_friction(velocity: Vec3, config: &LocomotionConfig, dt: f32) -> Vec3 {
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    let speed = horizontal.length();
    if speed <= f32::EPSILON {
        return velocity;
    }

    let control = speed.max(config.stop_speed);
    let drop = control * config.ground_friction * dt;
    let scale = (speed - drop).max(0.0) / speed;
    Vec3::new(velocity.x * scale, velocity.y, velocity.z * scale)
}

/// Velocity change that moves `velocity` toward `wish_speed` along `wish_direction`.
pub fn accelerate(
    velocity: Vec3,
    wish_direction: Vec3,
    wish_speed: f32,
    acceleration: f32,
    dt: f32,
) -> Vec3 {
    if wish_direction.length_squared() < 1e-6 || wish_speed <= 0.0 {
        return Vec3::ZERO;
    }

    let current_speed = velocity.dot(wish_direction);
    let add_speed = wish_speed - current_speed;
    if add_speed <= 0.0 {
        return Vec3::ZERO;
    }

    let accel_speed = (acceleration * dt * wish_speed).min(add_speed);
    wish_direction * accel_speed
}

/// Target speed for this step's intent.
pub fn wish_speed(intent: &MovementIntent, config: &LocomotionConfig) -> f32 {
    if !intent.has_movement() {
        return 0.0;
    }
    let sprinting =
        intent.sprint && (!config.sprint_requires_forward || intent.forward_input > 0.0);
    let base = if sprinting {
        config.sprint_speed
    } else {
        config.max_speed
    };
    base * intent.speed_multiplier.clamp(0.0, 1.0)
}

/// Reproject a wish direction that points into an unwalkable surface onto that surface.
pub fn deflect_off_slope(wish_direction: Vec3, normal: Vec3) -> Vec3 {
    if wish_direction.dot(normal) >= 0.0 {
        return wish_direction;
    }
    wish_direction.reject_from_normalized(normal).normalize_or_zero()
}

/// Countdown started by a jump. While running, ground sensing and further jumps are suspended.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpTimer {
    remaining: f32,
}

impl JumpTimer {
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration;
    }

    /// Count down toward zero; never increases.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Zero vertical velocity, then add the jump impulse.
pub fn jump<B: DynamicBody + ?Sized>(body: &mut B, config: &LocomotionConfig) {
    let mut velocity = body.linear_velocity();
    velocity.y = 0.0;
    body.set_linear_velocity(velocity);
    body.apply_impulse(Vec3::Y * config.jump_force);
}

/// Ground branch: friction (unless jumping), acceleration, then the jump itself.
pub fn ground_move<B: DynamicBody + ?Sized>(
    body: &mut B,
    config: &LocomotionConfig,
    intent: &MovementIntent,
    jump_queued: bool,
    dt: f32,
) {
    let mut velocity = body.linear_velocity();
    if !jump_queued {
        velocity = apply_friction(velocity, config, dt);
        body.set_linear_velocity(velocity);
    }

    let delta = accelerate(
        velocity,
        intent.horizontal_direction(),
        wish_speed(intent, config),
        config.ground_acceleration,
        dt,
    );
    if delta != Vec3::ZERO {
        body.apply_impulse(delta);
    }

    if jump_queued {
        jump(body, config);
    }
}

/// Air branch: air acceleration, deflected along steep surfaces the body is touching.
pub fn air_move<B: DynamicBody + ?Sized>(
    body: &mut B,
    config: &LocomotionConfig,
    intent: &MovementIntent,
    sample: &GroundSample,
    dt: f32,
) {
    let mut direction = intent.horizontal_direction();
    if sample.is_steep() {
        direction = deflect_off_slope(direction, sample.normal);
    }

    let delta = accelerate(
        body.linear_velocity(),
        direction,
        wish_speed(intent, config),
        config.air_acceleration,
        dt,
    );
    if delta != Vec3::ZERO {
        body.apply_impulse(delta);
    }
}
