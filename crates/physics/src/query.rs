//! Ray and sphere probes against the collider set.

use engine_core::Vec3;
use locomotion::{ProbeHit, SurfaceMask};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::*;

use crate::collision::surface_filter;
use crate::PhysicsWorld;

/// Result of a probe against the world.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the probe to the hit.
    pub distance: f32,
    /// World position of the probe origin at impact.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl From<SurfaceHit> for ProbeHit {
    fn from(hit: SurfaceHit) -> Self {
        ProbeHit {
            distance: hit.distance,
            normal: hit.normal,
        }
    }
}

/// A probe started inside a collider reports a zero normal; face it back at the probe.
fn resolve_normal(normal: Vec3, direction: Vec3) -> Vec3 {
    normal.try_normalize().unwrap_or(-direction)
}

impl PhysicsWorld {
    /// Cast a ray against surfaces in `mask`, ignoring colliders attached to `exclude`.
    pub fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<SurfaceHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let mut filter = surface_filter(mask);
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                SurfaceHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: resolve_normal(
                        Vec3::new(
                            intersection.normal.x,
                            intersection.normal.y,
                            intersection.normal.z,
                        ),
                        direction,
                    ),
                }
            })
    }

    /// Sweep a ball of `radius` against surfaces in `mask`, ignoring colliders of `exclude`.
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<SurfaceHit> {
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(origin.x, origin.y, origin.z);
        let shape_vel = vector![direction.x, direction.y, direction.z];

        let mut filter = surface_filter(mask);
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }

        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                &shape,
                ShapeCastOptions::with_max_time_of_impact(max_distance),
                filter,
            )
            .map(|(collider, hit)| {
                let distance = hit.time_of_impact;
                SurfaceHit {
                    collider,
                    distance,
                    point: origin + direction * distance,
                    normal: resolve_normal(
                        Vec3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z),
                        direction,
                    ),
                }
            })
    }
}
