//! Spatial sensing: the 3x3 downward probe grid and the forward predictive probe.
//!
//! Pure queries. A probe that finds nothing returns `None`; absence of ground is a
//! valid result, never an error.

use engine_core::heading_axes;
use glam::{Quat, Vec3};

use crate::backend::{ProbeHit, SpatialQuery, SurfaceMask};

/// Side length of the probe grid.
pub const GRID_SIZE: usize = 3;
pub const GRID_PROBES: usize = GRID_SIZE * GRID_SIZE;

/// One downward grid probe and what it found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridProbe {
    /// Horizontal offset from the body center.
    pub offset: Vec3,
    pub hit: Option<ProbeHit>,
}

/// Offsets of the grid probes: `{-1, 0, 1} * radius` along the heading's right and forward axes.
pub fn grid_offsets(orientation: Quat, grid_ray_radius: f32) -> [Vec3; GRID_PROBES] {
    let (forward, right) = heading_axes(orientation);
    let mut offsets = [Vec3::ZERO; GRID_PROBES];
    for (index, offset) in offsets.iter_mut().enumerate() {
        let x = (index % GRID_SIZE) as f32 - 1.0;
        let z = (index / GRID_SIZE) as f32 - 1.0;
        *offset = (right * x + forward * z) * grid_ray_radius;
    }
    offsets
}

/// Cast the probe grid straight down from `center`.
pub fn probe_grid<Q: SpatialQuery + ?Sized>(
    query: &Q,
    center: Vec3,
    orientation: Quat,
    grid_ray_radius: f32,
    max_distance: f32,
    mask: SurfaceMask,
) -> [GridProbe; GRID_PROBES] {
    grid_offsets(orientation, grid_ray_radius).map(|offset| GridProbe {
        offset,
        hit: query.ray_cast(center + offset, Vec3::NEG_Y, max_distance, mask),
    })
}

/// Result of the forward predictive probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardProbe {
    /// Unit direction of travel.
    pub direction: Vec3,
    pub speed: f32,
    pub hit: Option<ProbeHit>,
}

/// Sweep a sphere along `velocity` for `speed * prediction_time`.
///
/// Returns `None` when the body is (nearly) at rest and there is no direction to probe.
pub fn probe_forward<Q: SpatialQuery + ?Sized>(
    query: &Q,
    origin: Vec3,
    velocity: Vec3,
    prediction_time: f32,
    radius: f32,
    mask: SurfaceMask,
) -> Option<ForwardProbe> {
    let speed = velocity.length();
    if speed <= f32::EPSILON {
        return None;
    }
    let direction = velocity / speed;
    let distance = speed * prediction_time;
    Some(ForwardProbe {
        direction,
        speed,
        hit: query.sphere_cast(origin, radius, direction, distance, mask),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Plane, TestWorld};

    #[test]
    fn grid_has_center_and_corners() {
        let offsets = grid_offsets(Quat::IDENTITY, 0.5);
        assert_eq!(offsets[4], Vec3::ZERO);
        assert!(offsets.contains(&Vec3::new(0.5, 0.0, -0.5)));
        assert!(offsets.contains(&Vec3::new(-0.5, 0.0, 0.5)));
        assert!(offsets.iter().all(|o| o.y == 0.0));
    }

    #[test]
    fn grid_rotates_with_heading() {
        let offsets = grid_offsets(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), 1.0);
        // Right axis turns from +X to -Z.
        assert!((offsets[5] - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn flat_floor_hits_every_probe() {
        let world = TestWorld::floor(0.0);
        let center = Vec3::new(0.0, 2.0, 0.0);
        let probes = probe_grid(&world, center, Quat::IDENTITY, 0.3, 5.0, SurfaceMask::ALL);
        for probe in probes {
            let hit = probe.hit.expect("floor below");
            assert!((hit.distance - 2.0).abs() < 1e-5);
            assert_eq!(hit.normal, Vec3::Y);
        }
    }

    #[test]
    fn out_of_reach_floor_is_no_hit() {
        let world = TestWorld::floor(0.0);
        let center = Vec3::new(0.0, 10.0, 0.0);
        let probes = probe_grid(&world, center, Quat::IDENTITY, 0.3, 5.0, SurfaceMask::ALL);
        assert!(probes.iter().all(|p| p.hit.is_none()));
    }

    #[test]
    fn mask_filters_surfaces() {
        let world = TestWorld::empty().with(Plane::through(Vec3::ZERO, Vec3::Y).on_layer(0b10));
        let probes = probe_grid(&world, Vec3::Y, Quat::IDENTITY, 0.3, 5.0, SurfaceMask(0b01));
        assert!(probes.iter().all(|p| p.hit.is_none()));
    }

    #[test]
    fn forward_probe_uses_velocity_horizon() {
        let world = TestWorld::empty().with(Plane::through(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X));
        let fast = Vec3::new(20.0, 0.0, 0.0);
        let near = probe_forward(&world, Vec3::ZERO, fast, 0.3, 0.5, SurfaceMask::ALL);
        let near = near.expect("moving");
        let hit = near.hit.expect("wall within 6 m");
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert_eq!(near.speed, 20.0);

        let velocity = Vec3::new(2.0, 0.0, 0.0);
        let slow = probe_forward(&world, Vec3::ZERO, velocity, 0.3, 0.5, SurfaceMask::ALL);
        let slow = slow.expect("moving");
        assert!(slow.hit.is_none());
    }

    #[test]
    fn forward_probe_at_rest_is_none() {
        let world = TestWorld::floor(0.0);
        assert!(probe_forward(&world, Vec3::Y, Vec3::ZERO, 0.3, 0.5, SurfaceMask::ALL).is_none());
    }
}
