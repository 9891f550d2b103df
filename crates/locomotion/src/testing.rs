//! Analytic backend for unit tests: one-sided infinite planes and a recording body.

use engine_core::Bounds;
use glam::{Quat, Vec3};

use crate::backend::{DynamicBody, ProbeHit, SpatialQuery, SurfaceMask};

/// Plane `normal · x = offset`, solid behind the normal.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
    pub layer: u32,
}

impl Plane {
    pub fn through(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            offset: normal.dot(point),
            layer: 1,
        }
    }

    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    fn sweep(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
    ) -> Option<ProbeHit> {
        let facing = self.normal.dot(direction);
        if facing >= -1e-6 {
            return None;
        }
        let height = self.normal.dot(origin) - self.offset;
        if height < 0.0 {
            return None;
        }
        let distance = ((height - radius) / -facing).max(0.0);
        (distance <= max_distance).then_some(ProbeHit {
            distance,
            normal: self.normal,
        })
    }
}

#[derive(Debug, Default)]
pub struct TestWorld {
    pub planes: Vec<Plane>,
}

impl TestWorld {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flat floor at height `y`.
    pub fn floor(y: f32) -> Self {
        Self {
            planes: vec![Plane::through(Vec3::new(0.0, y, 0.0), Vec3::Y)],
        }
    }

    /// Slope through the origin, rising toward -X by `degrees`.
    pub fn slope(degrees: f32) -> Self {
        let angle = degrees.to_radians();
        let normal = Vec3::new(angle.sin(), angle.cos(), 0.0);
        Self {
            planes: vec![Plane::through(Vec3::ZERO, normal)],
        }
    }

    pub fn with(mut self, plane: Plane) -> Self {
        self.planes.push(plane);
        self
    }

    fn nearest(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.planes
            .iter()
            .filter(|plane| mask.contains(plane.layer))
            .filter_map(|plane| plane.sweep(origin, direction, radius, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl SpatialQuery for TestWorld {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.nearest(origin, direction, 0.0, max_distance, mask)
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.nearest(origin, direction, radius, max_distance, mask)
    }
}

/// Body double recording everything the solver asks of it.
#[derive(Debug)]
pub struct TestBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
    pub pending_impulse: Vec3,
    pub pending_acceleration: Vec3,
    pub gravity: bool,
}

impl TestBody {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            half_extents: Vec3::new(0.4, 1.0, 0.4),
            rotation: Quat::IDENTITY,
            pending_impulse: Vec3::ZERO,
            pending_acceleration: Vec3::ZERO,
            gravity: true,
        }
    }

    pub fn moving(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Flush pending changes and advance with semi-implicit Euler.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.pending_impulse + self.pending_acceleration * dt;
        self.position += self.velocity * dt;
        self.pending_impulse = Vec3::ZERO;
        self.pending_acceleration = Vec3::ZERO;
    }
}

impl DynamicBody for TestBody {
    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.half_extents)
    }

    fn orientation(&self) -> Quat {
        self.rotation
    }

    fn apply_impulse(&mut self, delta_velocity: Vec3) {
        self.pending_impulse += delta_velocity;
    }

    fn apply_acceleration(&mut self, acceleration: Vec3) {
        self.pending_acceleration += acceleration;
    }

    fn uses_gravity(&self) -> bool {
        self.gravity
    }

    fn set_uses_gravity(&mut self, enabled: bool) {
        self.gravity = enabled;
    }
}

/// A test world and body stepped together, the way a physics engine would.
pub struct TestRig {
    pub world: TestWorld,
    pub body: TestBody,
}

impl TestRig {
    /// Integrate the body, then push its box out of any plane it sank into
    /// and cancel the velocity driving it in, like a contact solver would.
    pub fn integrate(&mut self, dt: f32) {
        self.body.integrate(dt);
        for plane in &self.world.planes {
            let n = plane.normal;
            let support = n.abs().dot(self.body.half_extents);
            let height = n.dot(self.body.position) - plane.offset;
            let depth = support - height;
            if depth > 0.0 && height > -support {
                self.body.position += n * depth;
                let into = self.body.velocity.dot(n);
                if into < 0.0 {
                    self.body.velocity -= n * into;
                }
            }
        }
    }
}

impl SpatialQuery for TestRig {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.world.ray_cast(origin, direction, max_distance, mask)
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.world.sphere_cast(origin, radius, direction, max_distance, mask)
    }
}

impl DynamicBody for TestRig {
    fn linear_velocity(&self) -> Vec3 {
        self.body.linear_velocity()
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.body.set_linear_velocity(velocity);
    }

    fn bounds(&self) -> Bounds {
        self.body.bounds()
    }

    fn orientation(&self) -> Quat {
        self.body.orientation()
    }

    fn apply_impulse(&mut self, delta_velocity: Vec3) {
        self.body.apply_impulse(delta_velocity);
    }

    fn apply_acceleration(&mut self, acceleration: Vec3) {
        self.body.apply_acceleration(acceleration);
    }

    fn uses_gravity(&self) -> bool {
        self.body.uses_gravity()
    }

    fn set_uses_gravity(&mut self, enabled: bool) {
        self.body.set_uses_gravity(enabled);
    }
}
