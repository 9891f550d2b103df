//! Per-agent locomotion state and the fixed-step pipeline.

use glam::Vec3;

use crate::accelerator::{self, JumpTimer};
use crate::backend::LocomotionBackend;
use crate::config::LocomotionConfig;
use crate::error::LocomotionError;
use crate::ground::{self, GroundSample, GroundState};
use crate::hover::{self, HoverOutput, LandingRecovery};
use crate::intent::MovementIntent;
use crate::tunneling::{self, TunnelingCorrection};

/// Read-only status for animation, AI and UI. Updated once per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionStatus {
    pub state: GroundState,
    pub ground_normal: Vec3,
    pub recovering_from_landing: bool,
    pub hover_enabled: bool,
    /// Seconds left before ground sensing and jumping resume.
    pub jump_cooldown: f32,
}

/// What happened during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub ground: GroundSample,
    pub tunneling: Option<TunnelingCorrection>,
    pub hover: HoverOutput,
    pub jumped: bool,
    pub landed: bool,
}

/// One character driven by the locomotion solver.
///
/// Owns its own copy of the tuning and the little state that survives between
/// steps: the previous classification, the jump cooldown and landing recovery.
#[derive(Debug, Clone)]
pub struct LocomotionAgent {
    config: LocomotionConfig,
    hover_enabled: bool,
    previous_state: GroundState,
    ground: GroundSample,
    jump_timer: JumpTimer,
    landing: LandingRecovery,
}

impl LocomotionAgent {
    /// Create an agent. Fails if the config is invalid.
    pub fn new(config: LocomotionConfig) -> Result<Self, LocomotionError> {
        config.validate()?;
        Ok(Self {
            hover_enabled: config.hover_enabled,
            config,
            previous_state: GroundState::Airborne,
            ground: GroundSample::airborne(),
            jump_timer: JumpTimer::default(),
            landing: LandingRecovery::default(),
        })
    }

    /// Take over gravity from the physics engine. Call once after spawning the body.
    ///
    /// The solver applies scaled gravity itself so it never stacks with hover lift.
    pub fn attach<B: LocomotionBackend + ?Sized>(&self, backend: &mut B) {
        if backend.uses_gravity() {
            backend.set_uses_gravity(false);
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Run one fixed step against `backend`.
    pub fn step<B: LocomotionBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        intent: &MovementIntent,
        dt: f32,
    ) -> StepReport {
        let config = self.config;
        self.jump_timer.tick(dt);

        let tunneling = tunneling::guard(backend, &config);

        let ground = if self.jump_timer.is_active() {
            GroundSample::airborne()
        } else {
            let bounds = backend.bounds();
            ground::estimate(
                &*backend,
                &config,
                bounds.center,
                backend.orientation(),
                bounds.half_height(),
            )
        };

        let vertical_velocity = backend.linear_velocity().y;
        let landed = self
            .landing
            .update(self.previous_state, &ground, vertical_velocity, &config);
        if landed {
            log::debug!("landing recovery started at {:.2} m/s", vertical_velocity);
        }

        let jump_requested = intent.jump_pressed || (config.auto_bunny_hop && intent.jump_held);
        let jumped = ground.is_grounded()
            && jump_requested
            && !self.jump_timer.is_active()
            && config.jump_force > 0.0;
        if jumped {
            self.jump_timer.start(config.jump_cooldown);
            self.landing.reset();
            log::debug!("jump");
        }

        // A jump leaves the ground this step, so it gets airborne hover handling.
        let state = if jumped {
            GroundState::Airborne
        } else {
            ground.state
        };
        let settled = GroundSample { state, ..ground };
        let hover = hover::stabilize(
            backend,
            &config,
            &settled,
            self.hover_enabled,
            self.landing.is_active(),
        );

        if ground.is_grounded() {
            accelerator::ground_move(backend, &config, intent, jumped, dt);
        } else {
            accelerator::air_move(backend, &config, intent, &ground, dt);
        }

        if state != self.previous_state {
            log::debug!("ground state {:?} -> {:?}", self.previous_state, state);
        }
        self.previous_state = state;
        self.ground = settled;

        StepReport {
            ground: self.ground,
            tunneling,
            hover,
            jumped,
            landed,
        }
    }

    pub fn status(&self) -> LocomotionStatus {
        LocomotionStatus {
            state: self.ground.state,
            ground_normal: self.ground.normal,
            recovering_from_landing: self.landing.is_active(),
            hover_enabled: self.hover_enabled,
            jump_cooldown: self.jump_timer.remaining(),
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.ground.state == GroundState::Grounded
    }

    pub fn is_on_steep_slope(&self) -> bool {
        self.ground.state == GroundState::SteepSlope
    }

    pub fn ground_normal(&self) -> Vec3 {
        self.ground.normal
    }

    pub fn is_recovering_from_landing(&self) -> bool {
        self.landing.is_active()
    }

    pub fn hover_enabled(&self) -> bool {
        self.hover_enabled
    }

    /// Toggle hover suspension. Takes effect on the next step.
    pub fn set_hover_enabled(&mut self, enabled: bool) {
        if self.hover_enabled != enabled {
            log::debug!("hover {}", if enabled { "enabled" } else { "disabled" });
        }
        self.hover_enabled = enabled;
    }

    /// Last ground sample, with the classification the step settled on.
    pub fn ground_sample(&self) -> &GroundSample {
        &self.ground
    }
}
