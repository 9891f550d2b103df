//! Intent sources: the scripted player and wandering drones.

use glam::Vec3;
use locomotion::{LookDelta, LookPivot, MovementIntent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ScriptPhase;

/// Turns script phases into intents through a look pivot, the way mouse input would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPilot {
    pub look: LookPivot,
    jump_was_held: bool,
}

impl ScriptedPilot {
    pub fn intent(&mut self, phase: &ScriptPhase) -> MovementIntent {
        let target = phase.yaw_degrees.to_radians().rem_euclid(std::f32::consts::TAU);
        let turn = target - self.look.yaw;
        self.look.apply(LookDelta { yaw: turn, pitch: 0.0 }, 1.0);

        let jump_pressed = phase.jump && !self.jump_was_held;
        self.jump_was_held = phase.jump;
        self.look
            .intent(phase.forward, phase.strafe, phase.sprint, jump_pressed, phase.jump)
    }
}

/// Random heading changes inside a circle, seeded per drone.
#[derive(Debug, Clone)]
pub struct Wander {
    rng: StdRng,
    heading: Vec3,
    throttle: f32,
    retarget_in: f32,
    radius: f32,
}

impl Wander {
    pub fn new(seed: u64, radius: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            heading: Vec3::ZERO,
            throttle: 0.0,
            retarget_in: 0.0,
            radius,
        }
    }

    /// Intent for a drone at `position`; heads home once outside the wander radius.
    pub fn intent(&mut self, position: Vec3, dt: f32) -> MovementIntent {
        self.retarget_in -= dt;
        let flat = Vec3::new(position.x, 0.0, position.z);

        if flat.length() > self.radius {
            self.heading = (-flat).normalize_or_zero();
            self.throttle = 1.0;
            self.retarget_in = self.rng.gen_range(0.5..1.0);
        } else if self.retarget_in <= 0.0 {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            self.heading = Vec3::new(angle.cos(), 0.0, angle.sin());
            self.throttle = self.rng.gen_range(0.4..1.0);
            self.retarget_in = self.rng.gen_range(1.5..3.0);
            log::trace!(
                "wander retarget: heading {:?}, throttle {:.2}",
                self.heading,
                self.throttle
            );
        }

        MovementIntent {
            speed_multiplier: self.throttle,
            ..MovementIntent::toward(self.heading)
        }
    }
}

/// Who drives an agent.
#[derive(Debug, Clone)]
pub enum Controller {
    Scripted(ScriptedPilot),
    Wander(Wander),
}
