//! Per-step movement intent supplied by the input or AI layer.

use glam::{Quat, Vec3};

/// What the controlling player or AI wants this step. Read-only to the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementIntent {
    /// Horizontal wish direction; zero means no movement input.
    pub wish_direction: Vec3,
    /// Forward component of the raw input, used to gate sprinting.
    pub forward_input: f32,
    /// Scales the wish-speed (analog stick magnitude, AI throttle).
    pub speed_multiplier: f32,
    pub sprint: bool,
    /// Jump pressed this step (edge-triggered).
    pub jump_pressed: bool,
    /// Jump held this step (level-triggered, used for auto bunny-hop).
    pub jump_held: bool,
}

impl Default for MovementIntent {
    fn default() -> Self {
        Self {
            wish_direction: Vec3::ZERO,
            forward_input: 0.0,
            speed_multiplier: 1.0,
            sprint: false,
            jump_pressed: false,
            jump_held: false,
        }
    }
}

impl MovementIntent {
    /// Intent to move along `direction`; vertical component is discarded.
    pub fn toward(direction: Vec3) -> Self {
        let wish_direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        Self {
            wish_direction,
            forward_input: if wish_direction == Vec3::ZERO { 0.0 } else { 1.0 },
            ..Default::default()
        }
    }

    pub fn with_sprint(mut self, sprint: bool) -> Self {
        self.sprint = sprint;
        self
    }

    pub fn with_jump(mut self, pressed: bool, held: bool) -> Self {
        self.jump_pressed = pressed;
        self.jump_held = held;
        self
    }

    /// Horizontal unit wish direction, re-normalized defensively.
    pub fn horizontal_direction(&self) -> Vec3 {
        Vec3::new(self.wish_direction.x, 0.0, self.wish_direction.z).normalize_or_zero()
    }

    pub fn has_movement(&self) -> bool {
        self.horizontal_direction() != Vec3::ZERO
    }
}

/// Yaw/pitch deltas from the look device, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookDelta {
    pub yaw: f32,
    pub pitch: f32,
}

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Accumulated view angles of a player. Pass-through for building intents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookPivot {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookPivot {
    pub fn apply(&mut self, delta: LookDelta, sensitivity: f32) {
        self.yaw = (self.yaw + delta.yaw * sensitivity).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta.pitch * sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Body rotation (yaw only).
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Camera rotation (yaw then pitch).
    pub fn view_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Horizontal wish direction from forward/strafe axes in `-1..=1`.
    pub fn wish_direction(&self, forward: f32, strafe: f32) -> Vec3 {
        let rotation = self.body_rotation();
        let forward_axis = rotation * -Vec3::Z;
        let right_axis = rotation * Vec3::X;
        (forward_axis * forward + right_axis * strafe).normalize_or_zero()
    }

    /// Build a movement intent from raw axes and buttons.
    pub fn intent(
        &self,
        forward: f32,
        strafe: f32,
        sprint: bool,
        jump_pressed: bool,
        jump_held: bool,
    ) -> MovementIntent {
        MovementIntent {
            wish_direction: self.wish_direction(forward, strafe),
            forward_input: forward,
            speed_multiplier: forward.abs().max(strafe.abs()).min(1.0),
            sprint,
            jump_pressed,
            jump_held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toward_flattens_direction() {
        let intent = MovementIntent::toward(Vec3::new(3.0, 5.0, 4.0));
        assert!((intent.wish_direction - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert_eq!(intent.forward_input, 1.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut look = LookPivot::default();
        look.apply(LookDelta { yaw: 0.0, pitch: 10.0 }, 1.0);
        assert!((look.pitch - MAX_PITCH).abs() < 1e-6);
    }

    #[test]
    fn wish_direction_follows_yaw() {
        let look = LookPivot {
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.3,
        };
        // Quarter turn left: forward becomes -X.
        let dir = look.wish_direction(1.0, 0.0);
        assert!((dir - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn diagonal_input_is_unit_length() {
        let look = LookPivot::default();
        let intent = look.intent(1.0, 1.0, false, false, false);
        assert!((intent.wish_direction.length() - 1.0).abs() < 1e-5);
        assert_eq!(intent.speed_multiplier, 1.0);
    }
}
