//! The running sandbox: an ECS of hover agents stepped on a fixed timestep.

use std::time::Duration;

use anyhow::Result;
use engine_core::{HoverDrone, Name, Player, Time};
use glam::Vec3;
use hecs::World;
use locomotion::{GroundState, LocomotionAgent, StepReport};
use physics::rapier3d::prelude::InteractionGroups;
use physics::{CharacterBody, CharacterHandles, CollisionGroup, PhysicsWorld};

use crate::config::SandboxConfig;
use crate::script::{Controller, ScriptedPilot, Wander};
use crate::terrain::Arena;

const CAPSULE_HALF_HEIGHT: f32 = 0.5;
const CAPSULE_RADIUS: f32 = 0.4;
const SPAWN_CLEARANCE: f32 = 2.0;

/// Per-agent counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentStats {
    pub steps: u32,
    pub grounded_steps: u32,
    pub steep_steps: u32,
    pub jumps: u32,
    pub landings: u32,
    pub tunneling_corrections: u32,
    pub max_speed: f32,
}

impl AgentStats {
    fn record(&mut self, report: &StepReport, velocity: Vec3) {
        self.steps += 1;
        match report.ground.state {
            GroundState::Grounded => self.grounded_steps += 1,
            GroundState::SteepSlope => self.steep_steps += 1,
            GroundState::Airborne => {}
        }
        self.jumps += report.jumped as u32;
        self.landings += report.landed as u32;
        self.tunneling_corrections += report.tunneling.is_some() as u32;
        self.max_speed = self.max_speed.max(Vec3::new(velocity.x, 0.0, velocity.z).length());
    }

    pub fn grounded_ratio(&self) -> f32 {
        if self.steps == 0 {
            0.0
        } else {
            self.grounded_steps as f32 / self.steps as f32
        }
    }
}

/// One agent's results at the end of a run.
#[derive(Debug, Clone)]
pub struct AgentSummary {
    pub name: String,
    pub position: Vec3,
    pub state: GroundState,
    pub stats: AgentStats,
}

pub struct Sandbox {
    pub config: SandboxConfig,
    pub world: World,
    pub physics: PhysicsWorld,
    pub arena: Arena,
    pub time: Time,
    next_report: f32,
}

impl Sandbox {
    /// Build the arena and spawn the player and drones.
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let mut physics = PhysicsWorld::new();
        let arena = Arena::build(&mut physics, &config.terrain, config.seed);
        let mut time = Time::with_fixed_rate(config.fixed_rate_hz);
        time.set_max_substeps(8);

        let mut sandbox = Self {
            world: World::new(),
            physics,
            arena,
            time,
            next_report: 0.0,
            config,
        };

        sandbox.spawn_player()?;
        for i in 0..sandbox.config.drone_count {
            sandbox.spawn_drone(i)?;
        }
        sandbox.physics.update_query_pipeline();
        Ok(sandbox)
    }

    fn spawn_agent(
        &mut self,
        x: f32,
        z: f32,
        groups: InteractionGroups,
        agent: &LocomotionAgent,
    ) -> Result<CharacterHandles> {
        let y = self.arena.ground_height(x, z)
            + CAPSULE_HALF_HEIGHT
            + CAPSULE_RADIUS
            + agent.config().hover_height
            + SPAWN_CLEARANCE;
        let handles = self.physics.add_character(
            Vec3::new(x, y, z),
            CAPSULE_HALF_HEIGHT,
            CAPSULE_RADIUS,
            groups,
        );
        let mut body = CharacterBody::attach(&mut self.physics, handles)?;
        agent.attach(&mut body);
        Ok(handles)
    }

    fn spawn_player(&mut self) -> Result<()> {
        let agent = LocomotionAgent::new(self.config.player)?;
        let handles = self.spawn_agent(0.0, 0.0, CollisionGroup::player(), &agent)?;
        self.world.spawn((
            Player,
            Name("player".to_string()),
            handles,
            agent,
            Controller::Scripted(ScriptedPilot::default()),
            AgentStats::default(),
        ));
        Ok(())
    }

    fn spawn_drone(&mut self, index: u32) -> Result<()> {
        let agent = LocomotionAgent::new(self.config.drone)?;
        let count = self.config.drone_count.max(1) as f32;
        let angle = index as f32 / count * std::f32::consts::TAU;
        let radius = self.config.drone_ring_radius;
        let (x, z) = (angle.cos() * radius, angle.sin() * radius);
        let handles = self.spawn_agent(x, z, CollisionGroup::drone(), &agent)?;
        let seed = self.config.seed.wrapping_add(1 + index as u64);
        self.world.spawn((
            HoverDrone,
            Name(format!("drone-{index}")),
            handles,
            agent,
            Controller::Wander(Wander::new(seed, radius * 1.5)),
            AgentStats::default(),
        ));
        Ok(())
    }

    /// One fixed step: every agent reads its intent, the solver runs, then the world integrates.
    pub fn fixed_step(&mut self, dt: f32) -> Result<()> {
        let t = self.time.simulated_seconds();
        let phase = self.config.phase_at(t);

        for (_, (handles, agent, controller, stats)) in self.world.query_mut::<(
            &CharacterHandles,
            &mut LocomotionAgent,
            &mut Controller,
            &mut AgentStats,
        )>() {
            let position = self
                .physics
                .get_body_transform(handles.body)
                .map(|transform| transform.position)
                .unwrap_or_default();

            let intent = match controller {
                Controller::Scripted(pilot) => {
                    let intent = pilot.intent(&phase);
                    self.physics.set_body_yaw(handles.body, pilot.look.yaw);
                    if agent.hover_enabled() != phase.hover {
                        agent.set_hover_enabled(phase.hover);
                    }
                    intent
                }
                Controller::Wander(wander) => wander.intent(position, dt),
            };

            let mut body = CharacterBody::attach(&mut self.physics, *handles)?;
            let report = agent.step(&mut body, &intent, dt);
            body.commit();

            let velocity = self
                .physics
                .rigid_body_set
                .get(handles.body)
                .map(|b| Vec3::new(b.linvel().x, b.linvel().y, b.linvel().z))
                .unwrap_or_default();
            stats.record(&report, velocity);
        }

        self.physics.step(dt);
        Ok(())
    }

    /// Advance one render frame, running as many fixed steps as the clock allows.
    pub fn run_frame(&mut self, frame: Duration) -> Result<u32> {
        self.time.advance(frame);
        let steps = self.time.drain_fixed_steps();
        let dt = self.time.fixed_timestep_seconds();
        for _ in 0..steps {
            self.fixed_step(dt)?;
        }

        if self.time.simulated_seconds() >= self.next_report {
            self.log_status();
            self.next_report += self.config.report_interval_seconds.max(0.1);
        }
        Ok(steps)
    }

    /// Run until the configured duration has been simulated.
    pub fn run(&mut self) -> Result<Vec<AgentSummary>> {
        let frame = Duration::from_millis(self.config.frame_ms.max(1));
        while self.time.simulated_seconds() < self.config.duration_seconds {
            self.run_frame(frame)?;
        }
        Ok(self.summary())
    }

    fn log_status(&mut self) {
        let t = self.time.simulated_seconds();
        for (_, (name, handles, agent)) in self
            .world
            .query_mut::<(&Name, &CharacterHandles, &LocomotionAgent)>()
        {
            let status = agent.status();
            let position = self
                .physics
                .get_body_transform(handles.body)
                .map(|transform| transform.position)
                .unwrap_or_default();
            log::info!(
                "[{:6.2}s] {:<8} {:?} at ({:.1}, {:.2}, {:.1}) normal ({:.2}, {:.2}, {:.2}){}{}",
                t,
                name.0,
                status.state,
                position.x,
                position.y,
                position.z,
                status.ground_normal.x,
                status.ground_normal.y,
                status.ground_normal.z,
                if status.recovering_from_landing { " recovering" } else { "" },
                if status.hover_enabled { "" } else { " hover-off" },
            );
        }
    }

    /// Per-agent results, player first.
    pub fn summary(&self) -> Vec<AgentSummary> {
        let mut summaries: Vec<(bool, AgentSummary)> = self
            .world
            .query::<(&Name, &CharacterHandles, &LocomotionAgent, &AgentStats, Option<&Player>)>()
            .iter()
            .map(|(_, (name, handles, agent, stats, player))| {
                let position = self
                    .physics
                    .get_body_transform(handles.body)
                    .map(|transform| transform.position)
                    .unwrap_or_default();
                (
                    player.is_none(),
                    AgentSummary {
                        name: name.0.clone(),
                        position,
                        state: agent.status().state,
                        stats: stats.clone(),
                    },
                )
            })
            .collect();
        summaries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
        summaries.into_iter().map(|(_, summary)| summary).collect()
    }
}
