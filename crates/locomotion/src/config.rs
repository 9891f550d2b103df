//! Locomotion tuning. One value per agent, copied at spawn and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::backend::SurfaceMask;
use crate::error::LocomotionError;

/// How grid probe errors are combined into one distance error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProbeWeighting {
    /// Every hit counts the same.
    Uniform,
    /// Hits closer to the body center count more: `w = 1 / (1 + offset)`.
    InverseDistance,
}

/// Rule deciding when a walkable-angle hit counts as grounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GroundingPolicy {
    /// Any hit on a walkable slope grounds the agent.
    AngleOnly,
    /// The averaged distance error must also be no further than `tolerance`
    /// above the hover target, so a high ledge does not ground the agent.
    AngleAndProximity { tolerance: f32 },
}

/// Tuning parameters for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    // ------------------------------------------------------------------
    // Speeds and acceleration
    // ------------------------------------------------------------------
    /// Walking wish-speed (m/s).
    pub max_speed: f32,
    /// Wish-speed while sprinting (m/s).
    pub sprint_speed: f32,
    /// Only honor sprint while the intent has a forward component.
    pub sprint_requires_forward: bool,
    /// Ground acceleration (1/s, scaled by wish-speed).
    pub ground_acceleration: f32,
    /// Air acceleration (1/s, scaled by wish-speed).
    pub air_acceleration: f32,
    /// Ground friction coefficient.
    pub ground_friction: f32,
    /// Speeds below this are treated as this for friction, so slow drift stops quickly.
    pub stop_speed: f32,

    // ------------------------------------------------------------------
    // Jumping
    // ------------------------------------------------------------------
    /// Upward velocity change of a jump (m/s).
    pub jump_force: f32,
    /// Seconds after a jump during which ground sensing and jumping are suspended.
    pub jump_cooldown: f32,
    /// Re-queue a jump every step the jump action is held.
    pub auto_bunny_hop: bool,

    // ------------------------------------------------------------------
    // Hover suspension
    // ------------------------------------------------------------------
    pub hover_enabled: bool,
    /// Desired gap between collider bottom and ground (m).
    pub hover_height: f32,
    /// Proportional gain (1/s²).
    pub hover_force: f32,
    /// Damping gain (1/s).
    pub hover_damping: f32,
    /// Bound on the stabilizer output (m/s²).
    pub max_hover_correction: f32,
    /// Extra probe reach below the hover target (m).
    pub ground_check_distance: f32,
    /// Spacing of the 3x3 probe grid (m).
    pub grid_ray_radius: f32,
    pub probe_weighting: ProbeWeighting,
    pub grounding_policy: GroundingPolicy,
    /// Surfaces the ground and tunneling probes may hit.
    pub walkable_mask: SurfaceMask,

    // ------------------------------------------------------------------
    // Slopes and landing
    // ------------------------------------------------------------------
    /// Steepest walkable slope (degrees from up).
    pub slope_limit_degrees: f32,
    /// Downhill acceleration on steep slopes (m/s²).
    pub steep_slide_force: f32,
    /// Per-step multiplier for upward velocity on steep slopes (0..=1).
    pub steep_climb_damping: f32,
    /// Vertical velocity below which an airborne agent counts as falling (m/s, negative).
    pub landing_fall_threshold: f32,
    /// Peak upward acceleration of landing recovery (m/s²).
    pub landing_recovery_force: f32,
    /// Distance error at which landing recovery ends (m).
    pub landing_recovery_epsilon: f32,

    // ------------------------------------------------------------------
    // Gravity
    // ------------------------------------------------------------------
    /// Gravity magnitude (m/s²).
    pub gravity: f32,
    pub gravity_scale: f32,

    // ------------------------------------------------------------------
    // Tunneling guard
    // ------------------------------------------------------------------
    /// Look-ahead horizon (s).
    pub prediction_time: f32,
    /// Radius of the predictive sphere probe (m).
    pub prediction_radius: f32,
    /// Repulsion per unit of closing speed.
    pub wall_repulsion: f32,
    /// Below this speed the guard does nothing (m/s).
    pub tunneling_min_speed: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self::player()
    }
}

impl LocomotionConfig {
    /// Player tuning: uniform probe weighting, angle-only grounding.
    pub fn player() -> Self {
        Self {
            max_speed: 7.0,
            sprint_speed: 11.0,
            sprint_requires_forward: true,
            ground_acceleration: 14.0,
            air_acceleration: 2.0,
            ground_friction: 6.0,
            stop_speed: 1.5,

            jump_force: 6.5,
            jump_cooldown: 0.25,
            auto_bunny_hop: true,

            hover_enabled: true,
            hover_height: 0.4,
            hover_force: 200.0,
            hover_damping: 10.0,
            max_hover_correction: 50.0,
            ground_check_distance: 0.5,
            grid_ray_radius: 0.3,
            probe_weighting: ProbeWeighting::Uniform,
            grounding_policy: GroundingPolicy::AngleOnly,
            walkable_mask: SurfaceMask::ALL,

            slope_limit_degrees: 45.0,
            steep_slide_force: 12.0,
            steep_climb_damping: 0.5,
            landing_fall_threshold: -4.0,
            landing_recovery_force: 30.0,
            landing_recovery_epsilon: 0.02,

            gravity: 9.81,
            gravity_scale: 2.0,

            prediction_time: 0.1,
            prediction_radius: 0.35,
            wall_repulsion: 0.3,
            tunneling_min_speed: 8.0,
        }
    }

    /// AI hover-drone tuning: inverse-distance weighting, angle-and-proximity grounding.
    pub fn hover_drone() -> Self {
        Self {
            max_speed: 5.0,
            sprint_speed: 9.0,
            sprint_requires_forward: false,
            ground_acceleration: 8.0,
            air_acceleration: 4.0,
            ground_friction: 4.0,
            stop_speed: 1.0,

            jump_force: 0.0,
            auto_bunny_hop: false,

            hover_height: 1.2,
            hover_force: 120.0,
            hover_damping: 14.0,
            max_hover_correction: 40.0,
            ground_check_distance: 1.5,
            grid_ray_radius: 0.5,
            probe_weighting: ProbeWeighting::InverseDistance,
            grounding_policy: GroundingPolicy::AngleAndProximity { tolerance: 0.6 },

            slope_limit_degrees: 50.0,
            gravity_scale: 1.0,
            tunneling_min_speed: 6.0,
            ..Self::player()
        }
    }

    /// Cosine of the slope limit, for comparing against `normal.y`.
    pub fn slope_limit_cos(&self) -> f32 {
        self.slope_limit_degrees.to_radians().cos()
    }

    /// Scaled gravity acceleration magnitude.
    pub fn effective_gravity(&self) -> f32 {
        self.gravity * self.gravity_scale
    }

    /// Check every parameter. Agents refuse to start with an invalid config.
    pub fn validate(&self) -> Result<(), LocomotionError> {
        fn finite_non_negative(
            value: f32,
            field: &'static str,
        ) -> Result<(), LocomotionError> {
            if !value.is_finite() {
                return Err(LocomotionError::invalid(field, "must be finite"));
            }
            if value < 0.0 {
                return Err(LocomotionError::invalid(field, "must not be negative"));
            }
            Ok(())
        }

        for (value, field) in [
            (self.max_speed, "max_speed"),
            (self.sprint_speed, "sprint_speed"),
            (self.ground_acceleration, "ground_acceleration"),
            (self.air_acceleration, "air_acceleration"),
            (self.ground_friction, "ground_friction"),
            (self.stop_speed, "stop_speed"),
            (self.jump_force, "jump_force"),
            (self.jump_cooldown, "jump_cooldown"),
            (self.hover_force, "hover_force"),
            (self.hover_damping, "hover_damping"),
            (self.max_hover_correction, "max_hover_correction"),
            (self.ground_check_distance, "ground_check_distance"),
            (self.grid_ray_radius, "grid_ray_radius"),
            (self.steep_slide_force, "steep_slide_force"),
            (self.landing_recovery_force, "landing_recovery_force"),
            (self.landing_recovery_epsilon, "landing_recovery_epsilon"),
            (self.gravity, "gravity"),
            (self.gravity_scale, "gravity_scale"),
            (self.prediction_time, "prediction_time"),
            (self.prediction_radius, "prediction_radius"),
            (self.wall_repulsion, "wall_repulsion"),
            (self.tunneling_min_speed, "tunneling_min_speed"),
        ] {
            finite_non_negative(value, field)?;
        }

        if !(self.hover_height.is_finite() && self.hover_height > 0.0) {
            return Err(LocomotionError::invalid("hover_height", "must be positive"));
        }
        if !(self.slope_limit_degrees > 0.0 && self.slope_limit_degrees < 90.0) {
            return Err(LocomotionError::invalid(
                "slope_limit_degrees",
                "must be strictly between 0 and 90",
            ));
        }
        if !(0.0..=1.0).contains(&self.steep_climb_damping) {
            return Err(LocomotionError::invalid(
                "steep_climb_damping",
                "must be within 0..=1",
            ));
        }
        if !(self.landing_fall_threshold.is_finite() && self.landing_fall_threshold <= 0.0) {
            return Err(LocomotionError::invalid(
                "landing_fall_threshold",
                "must be zero or negative",
            ));
        }
        if let GroundingPolicy::AngleAndProximity { tolerance } = self.grounding_policy {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(LocomotionError::invalid(
                    "grounding_policy.tolerance",
                    "must not be negative",
                ));
            }
        }
        if self.sprint_speed < self.max_speed {
            log::warn!(
                "sprint_speed {} is below max_speed {}; sprinting will slow the agent",
                self.sprint_speed,
                self.max_speed
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert_eq!(LocomotionConfig::player().validate(), Ok(()));
        assert_eq!(LocomotionConfig::hover_drone().validate(), Ok(()));
    }

    #[test]
    fn presets_illustrate_both_policies() {
        let player = LocomotionConfig::player();
        let drone = LocomotionConfig::hover_drone();
        assert_eq!(player.probe_weighting, ProbeWeighting::Uniform);
        assert_eq!(player.grounding_policy, GroundingPolicy::AngleOnly);
        assert_eq!(drone.probe_weighting, ProbeWeighting::InverseDistance);
        assert!(matches!(
            drone.grounding_policy,
            GroundingPolicy::AngleAndProximity { .. }
        ));
    }

    #[test]
    fn rejects_negative_gain() {
        let config = LocomotionConfig {
            hover_force: -1.0,
            ..LocomotionConfig::player()
        };
        assert_eq!(
            config.validate(),
            Err(LocomotionError::InvalidConfig {
                field: "hover_force",
                reason: "must not be negative",
            })
        );
    }

    #[test]
    fn rejects_nan() {
        let config = LocomotionConfig {
            prediction_time: f32::NAN,
            ..LocomotionConfig::player()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_vertical_slope_limit() {
        let config = LocomotionConfig {
            slope_limit_degrees: 90.0,
            ..LocomotionConfig::player()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_hover_height() {
        let config = LocomotionConfig {
            hover_height: 0.0,
            ..LocomotionConfig::player()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn slope_limit_cos_matches_degrees() {
        let config = LocomotionConfig {
            slope_limit_degrees: 60.0,
            ..LocomotionConfig::player()
        };
        assert!((config.slope_limit_cos() - 0.5).abs() < 1e-6);
    }
}
