//! Sandbox arena: noise heightfield, a walkable ramp and a thin wall.
//!
//! All noise is derived from the sandbox seed, so the same seed always gives the
//! same arena.

use glam::{Quat, Vec3};
use noise::{NoiseFn, Perlin, Simplex};
use physics::{CollisionGroup, PhysicsWorld};

use crate::config::TerrainSettings;

/// Derive a deterministic u32 noise seed from a world seed and an offset.
#[inline]
fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Square grid of heights centered on the origin. Row index runs along Z, column along X.
#[derive(Debug, Clone)]
pub struct Heightfield {
    pub heights: Vec<f32>,
    pub resolution: usize,
    pub size: f32,
}

impl Heightfield {
    pub fn generate(settings: &TerrainSettings, seed: u64) -> Self {
        let res = settings.resolution.max(2);
        let perlin = Perlin::new(deterministic_noise_seed(seed, 0));
        let simplex = Simplex::new(deterministic_noise_seed(seed, 1));
        let step = settings.size / (res - 1) as f32;
        let half_size = settings.size / 2.0;

        let mut heights = Vec::with_capacity(res * res);
        for z in 0..res {
            for x in 0..res {
                let world_x = (x as f32 * step - half_size) as f64;
                let world_z = (z as f32 * step - half_size) as f64;
                let n = fractal_noise(&perlin, &simplex, world_x, world_z, settings);
                heights.push((n as f32 - 0.5) * settings.height_scale);
            }
        }

        Self {
            heights,
            resolution: res,
            size: settings.size,
        }
    }

    /// Bilinear height at world (x, z), clamped to the grid edge.
    pub fn sample_height(&self, x: f32, z: f32) -> f32 {
        let res = self.resolution;
        let half_size = self.size / 2.0;
        let step = self.size / (res - 1) as f32;

        let gx = ((x + half_size) / step).clamp(0.0, (res - 1) as f32);
        let gz = ((z + half_size) / step).clamp(0.0, (res - 1) as f32);
        let x0 = (gx.floor() as usize).min(res - 2);
        let z0 = (gz.floor() as usize).min(res - 2);
        let fx = gx - x0 as f32;
        let fz = gz - z0 as f32;

        let h00 = self.heights[z0 * res + x0];
        let h10 = self.heights[z0 * res + x0 + 1];
        let h01 = self.heights[(z0 + 1) * res + x0];
        let h11 = self.heights[(z0 + 1) * res + x0 + 1];

        let top = h00 + (h10 - h00) * fx;
        let bottom = h01 + (h11 - h01) * fx;
        top + (bottom - top) * fz
    }
}

fn fractal_noise(
    perlin: &Perlin,
    simplex: &Simplex,
    x: f64,
    z: f64,
    settings: &TerrainSettings,
) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = settings.frequency;
    let mut max_value = 0.0;

    for _ in 0..settings.octaves.max(1) {
        let perlin_sample = perlin.get([x * frequency, z * frequency]);
        let simplex_sample = simplex.get([x * frequency + 1000.0, z * frequency + 1000.0]);
        value += (perlin_sample * 0.7 + simplex_sample * 0.3) * amplitude;
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    // Normalize to 0-1 range
    (value / max_value + 1.0) * 0.5
}

/// Ground, ramp and wall colliders; keeps the heightfield for spawn heights.
#[derive(Debug)]
pub struct Arena {
    pub heightfield: Heightfield,
}

impl Arena {
    /// Insert the arena into `world` and refresh its query pipeline.
    pub fn build(world: &mut PhysicsWorld, settings: &TerrainSettings, seed: u64) -> Self {
        let heightfield = Heightfield::generate(settings, seed);
        let res = heightfield.resolution;
        world.add_terrain_heightfield(
            &heightfield.heights,
            res,
            res,
            settings.size,
            settings.size,
            0.0,
            0.0,
        );

        let ramp_half = Vec3::new(4.0, 0.2, 3.0);
        let ramp_base = heightfield.sample_height(settings.ramp_x, 0.0);
        let ramp_rise = ramp_half.x * settings.ramp_angle_degrees.to_radians().sin();
        world.add_ramp(
            Vec3::new(settings.ramp_x, ramp_base + ramp_rise * 0.5, 0.0),
            settings.ramp_angle_degrees,
            ramp_half,
        );

        let wall_base = heightfield.sample_height(settings.wall_x, 0.0);
        world.add_static_cuboid(
            Vec3::new(settings.wall_x, wall_base + 2.0, 0.0),
            Quat::IDENTITY,
            Vec3::new(settings.wall_half_thickness, 3.0, settings.size * 0.25),
            CollisionGroup::wall(),
        );

        world.update_query_pipeline();
        log::info!(
            "Arena built: {}x{} heightfield over {:.0} m, ramp {:.0} deg at x={:.1}, \
             wall at x={:.1}",
            res,
            res,
            settings.size,
            settings.ramp_angle_degrees,
            settings.ramp_x,
            settings.wall_x
        );

        Self { heightfield }
    }

    pub fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.heightfield.sample_height(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locomotion::SurfaceMask;

    #[test]
    fn same_seed_same_heights() {
        let settings = TerrainSettings::default();
        let a = Heightfield::generate(&settings, 11);
        let b = Heightfield::generate(&settings, 11);
        assert_eq!(a.heights, b.heights);
    }

    #[test]
    fn different_seed_different_heights() {
        let settings = TerrainSettings::default();
        let a = Heightfield::generate(&settings, 1);
        let b = Heightfield::generate(&settings, 2);
        assert_ne!(a.heights, b.heights);
    }

    #[test]
    fn heights_stay_within_scale() {
        let settings = TerrainSettings::default();
        let field = Heightfield::generate(&settings, 3);
        let limit = settings.height_scale * 0.6;
        assert!(field.heights.iter().all(|h| h.abs() <= limit));
    }

    #[test]
    fn zero_scale_is_flat() {
        let settings = TerrainSettings {
            height_scale: 0.0,
            ..TerrainSettings::default()
        };
        let field = Heightfield::generate(&settings, 3);
        assert_eq!(field.sample_height(5.3, -12.1), 0.0);
        assert_eq!(field.sample_height(1000.0, 1000.0), 0.0);
    }

    #[test]
    fn sample_matches_grid_points() {
        let settings = TerrainSettings::default();
        let field = Heightfield::generate(&settings, 5);
        let step = settings.size / (field.resolution - 1) as f32;
        let half = settings.size / 2.0;
        let (col, row) = (10, 20);
        let expected = field.heights[row * field.resolution + col];
        let sampled = field.sample_height(col as f32 * step - half, row as f32 * step - half);
        assert!((sampled - expected).abs() < 1e-4);
    }

    #[test]
    fn collider_surface_matches_samples() {
        let mut world = PhysicsWorld::new();
        let settings = TerrainSettings::default();
        let arena = Arena::build(&mut world, &settings, 9);
        let (x, z) = (-20.0, 15.0);
        let hit = world
            .ray_cast(Vec3::new(x, 10.0, z), Vec3::NEG_Y, 20.0, SurfaceMask::ALL, None)
            .expect("terrain below");
        let surface = 10.0 - hit.distance;
        // Rapier triangulates cells, so allow some slack against the bilinear sample.
        assert!((surface - arena.ground_height(x, z)).abs() < 0.1);
    }
}
