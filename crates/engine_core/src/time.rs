//! Time management for the fixed-timestep simulation loop.

use std::time::{Duration, Instant};

/// Upper bound on fixed steps drained in one frame, so a long stall
/// cannot trigger an ever-growing backlog of catch-up steps.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 8;

/// Tracks frame time and hands out fixed physics steps.
#[derive(Debug)]
pub struct Time {
    /// Time of the last wall-clock frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total simulated time consumed by fixed steps.
    simulated: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed steps executed since start.
    step_count: u64,
    /// Fixed timestep for physics (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time not yet consumed by fixed steps.
    accumulator: Duration,
    max_substeps: u32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager at 60 Hz.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            simulated: Duration::ZERO,
            frame_count: 0,
            step_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
        }
    }

    /// Create a time manager with the given fixed rate in Hz.
    pub fn with_fixed_rate(hz: f64) -> Self {
        let mut time = Self::new();
        time.set_fixed_rate(hz);
        time
    }

    /// Update timing from the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Advance by an explicit frame duration (headless / deterministic runs).
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.simulated += self.fixed_timestep;
            self.step_count += 1;
            true
        } else {
            false
        }
    }

    /// Drain the accumulator and return how many fixed steps to run this frame.
    ///
    /// At most `max_substeps` steps are returned; any excess backlog is dropped.
    pub fn drain_fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while steps < self.max_substeps && self.should_fixed_update() {
            steps += 1;
        }
        if steps == self.max_substeps && self.accumulator >= self.fixed_timestep {
            log::warn!(
                "Dropping {:.1} ms of simulation backlog",
                self.accumulator.as_secs_f64() * 1000.0
            );
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Get the delta time of the last frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total simulated time in seconds.
    pub fn simulated_seconds(&self) -> f32 {
        self.simulated.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the number of fixed steps run so far.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }

    /// Set the maximum number of fixed steps drained per frame.
    pub fn set_max_substeps(&mut self, max: u32) {
        self.max_substeps = max.max(1);
    }
}
