//! Ground estimation: folds the probe grid into one distance error, normal and classification.

use glam::{Quat, Vec3};

use crate::backend::SpatialQuery;
use crate::config::{GroundingPolicy, LocomotionConfig, ProbeWeighting};
use crate::sensor::{probe_grid, GridProbe};

/// Ground classification for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroundState {
    #[default]
    Airborne,
    Grounded,
    /// Touching a surface steeper than the slope limit.
    SteepSlope,
}

/// Everything the estimator learned this step. Rebuilt from scratch every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSample {
    pub hit_count: usize,
    /// `hover_height - (hit_distance - half_height)`, averaged. Positive = too low.
    pub distance_error: f32,
    /// Averaged unit normal; world up when nothing was hit.
    pub normal: Vec3,
    /// Angle between `normal` and world up, in degrees.
    pub slope_angle: f32,
    pub state: GroundState,
}

impl GroundSample {
    /// Sample used when nothing was hit or sensing was suspended.
    pub fn airborne() -> Self {
        Self {
            hit_count: 0,
            distance_error: 0.0,
            normal: Vec3::Y,
            slope_angle: 0.0,
            state: GroundState::Airborne,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.state == GroundState::Grounded
    }

    pub fn is_steep(&self) -> bool {
        self.state == GroundState::SteepSlope
    }

    pub fn has_ground(&self) -> bool {
        self.hit_count > 0
    }
}

impl Default for GroundSample {
    fn default() -> Self {
        Self::airborne()
    }
}

/// Probe reach below the body center.
pub fn probe_length(config: &LocomotionConfig, half_height: f32) -> f32 {
    half_height + config.hover_height + config.ground_check_distance
}

/// Probe the ground below `center` and classify it.
pub fn estimate<Q: SpatialQuery + ?Sized>(
    query: &Q,
    config: &LocomotionConfig,
    center: Vec3,
    orientation: Quat,
    half_height: f32,
) -> GroundSample {
    let probes = probe_grid(
        query,
        center,
        orientation,
        config.grid_ray_radius,
        probe_length(config, half_height),
        config.walkable_mask,
    );
    aggregate(&probes, config, half_height)
}

/// Combine grid probes into a [`GroundSample`].
pub fn aggregate(
    probes: &[GridProbe],
    config: &LocomotionConfig,
    half_height: f32,
) -> GroundSample {
    let mut hit_count = 0;
    let mut weighted_error = 0.0;
    let mut total_weight = 0.0;
    let mut normal_sum = Vec3::ZERO;

    for probe in probes {
        let Some(hit) = probe.hit else { continue };
        let weight = match config.probe_weighting {
            ProbeWeighting::Uniform => 1.0,
            ProbeWeighting::InverseDistance => 1.0 / (1.0 + probe.offset.length()),
        };
        let error = config.hover_height - (hit.distance - half_height);
        hit_count += 1;
        weighted_error += error * weight;
        total_weight += weight;
        normal_sum += hit.normal;
    }

    if hit_count == 0 {
        return GroundSample::airborne();
    }

    let normal = normal_sum.try_normalize().unwrap_or(Vec3::Y);
    let distance_error = weighted_error / total_weight;
    let slope_angle = normal.dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees();

    let within_reach = match config.grounding_policy {
        GroundingPolicy::AngleOnly => true,
        GroundingPolicy::AngleAndProximity { tolerance } => distance_error >= -tolerance,
    };

    let state = if !within_reach {
        GroundState::Airborne
    } else if slope_angle <= config.slope_limit_degrees {
        GroundState::Grounded
    } else {
        GroundState::SteepSlope
    };

    GroundSample {
        hit_count,
        distance_error,
        normal,
        slope_angle,
        state,
    }
}
