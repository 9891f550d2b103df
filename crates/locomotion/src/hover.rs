//! Hover suspension: PD stabilizer, steep-slope sliding, landing recovery and fallback gravity.

use glam::Vec3;

use crate::backend::DynamicBody;
use crate::config::LocomotionConfig;
use crate::ground::{GroundSample, GroundState};

/// PD correction along the lift axis, clamped to `±max_hover_correction`.
///
/// `velocity_along` is the body velocity projected on the lift axis.
pub fn pd_correction(distance_error: f32, velocity_along: f32, config: &LocomotionConfig) -> f32 {
    let raw = distance_error * config.hover_force - velocity_along * config.hover_damping;
    raw.clamp(-config.max_hover_correction, config.max_hover_correction)
}

/// Extra lift while recovering from a hard landing. Zero once the body is back at its target.
pub fn recovery_boost(distance_error: f32, config: &LocomotionConfig) -> f32 {
    let ratio = (distance_error / config.hover_height).clamp(0.0, 1.0);
    config.landing_recovery_force * ratio.sqrt()
}

/// Downhill direction along a surface with the given normal. Zero on flat ground.
pub fn downhill(normal: Vec3) -> Vec3 {
    Vec3::NEG_Y.reject_from_normalized(normal).normalize_or_zero()
}

/// Tracks falls so the first steps back in contact with a surface get extra lift.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandingRecovery {
    falling: bool,
    active: bool,
}

impl LandingRecovery {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance with this step's classification. Returns true on the step recovery starts.
    pub fn update(
        &mut self,
        previous: GroundState,
        sample: &GroundSample,
        vertical_velocity: f32,
        config: &LocomotionConfig,
    ) -> bool {
        match sample.state {
            GroundState::Airborne => {
                if vertical_velocity < config.landing_fall_threshold {
                    self.falling = true;
                }
                self.active = false;
                false
            }
            GroundState::Grounded | GroundState::SteepSlope => {
                let started = previous == GroundState::Airborne && self.falling;
                if started {
                    self.active = true;
                }
                self.falling = false;
                if self.active
                    && vertical_velocity >= 0.0
                    && sample.distance_error <= config.landing_recovery_epsilon
                {
                    self.active = false;
                }
                started && self.active
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What the stabilizer did this step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoverOutput {
    /// Clamped PD output (m/s²) along `lift`.
    pub correction: f32,
    pub lift: Vec3,
    /// Landing recovery lift (m/s²) along world up.
    pub recovery: f32,
    /// Steep-slope slide acceleration.
    pub slide: Vec3,
    pub gravity_applied: bool,
}

/// Apply the vertical part of the step to `body`.
///
/// With hover enabled, grounded bodies get the PD lift and no gravity; steep slopes get
/// lift along the surface normal plus sliding and gravity. With hover disabled, gravity
/// is applied while not grounded and downward velocity is cancelled on contact.
pub fn stabilize<B: DynamicBody + ?Sized>(
    body: &mut B,
    config: &LocomotionConfig,
    sample: &GroundSample,
    hover_enabled: bool,
    recovering: bool,
) -> HoverOutput {
    let mut output = HoverOutput::default();
    let gravity = Vec3::NEG_Y * config.effective_gravity();
    let mut velocity = body.linear_velocity();

    if !hover_enabled {
        if sample.state == GroundState::Grounded {
            if velocity.y < 0.0 {
                velocity.y = 0.0;
                body.set_linear_velocity(velocity);
            }
        } else {
            body.apply_acceleration(gravity);
            output.gravity_applied = true;
        }
        return output;
    }

    match sample.state {
        GroundState::Airborne => {
            body.apply_acceleration(gravity);
            output.gravity_applied = true;
        }
        GroundState::Grounded => {
            output.lift = Vec3::Y;
            output.correction = pd_correction(sample.distance_error, velocity.y, config);
            body.apply_acceleration(Vec3::Y * output.correction);
            if recovering {
                output.recovery = recovery_boost(sample.distance_error, config);
                body.apply_acceleration(Vec3::Y * output.recovery);
            }
        }
        GroundState::SteepSlope => {
            if velocity.y > 0.0 {
                velocity.y *= config.steep_climb_damping;
                body.set_linear_velocity(velocity);
            }
            output.lift = sample.normal;
            output.correction =
                pd_correction(sample.distance_error, velocity.dot(sample.normal), config);
            output.slide = downhill(sample.normal) * config.steep_slide_force;
            if recovering {
                output.recovery = recovery_boost(sample.distance_error, config);
            }
            let lift = sample.normal * output.correction + Vec3::Y * output.recovery;
            body.apply_acceleration(lift + output.slide + gravity);
            output.gravity_applied = true;
        }
    }

    log::trace!(
        "hover {:?}: error {:.3} correction {:.2} recovery {:.2}",
        sample.state,
        sample.distance_error,
        output.correction,
        output.recovery
    );
    output
}
