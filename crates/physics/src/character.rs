//! Rapier-backed character body for the locomotion solver.
//!
//! Impulses and accelerations requested during a solver step are buffered and
//! only reach the rigid body on [`CharacterBody::commit`], right before the
//! world is stepped. Velocity writes go through immediately.

use engine_core::{Bounds, Quat, Vec3};
use locomotion::{DynamicBody, LocomotionError, ProbeHit, SpatialQuery, SurfaceMask};
use rapier3d::prelude::*;

use crate::physics_world::{CharacterHandles, PhysicsWorld};

/// A character's rigid body borrowed out of the physics world for one step.
pub struct CharacterBody<'w> {
    world: &'w mut PhysicsWorld,
    handles: CharacterHandles,
    impulse: Vec3,
    acceleration: Vec3,
}

impl<'w> CharacterBody<'w> {
    /// Borrow the character's body and collider, failing if either was removed.
    pub fn attach(
        world: &'w mut PhysicsWorld,
        handles: CharacterHandles,
    ) -> Result<Self, LocomotionError> {
        if !world.rigid_body_set.contains(handles.body) {
            return Err(LocomotionError::MissingBody);
        }
        if !world.collider_set.contains(handles.collider) {
            return Err(LocomotionError::MissingCollider);
        }
        Ok(Self {
            world,
            handles,
            impulse: Vec3::ZERO,
            acceleration: Vec3::ZERO,
        })
    }

    pub fn handles(&self) -> CharacterHandles {
        self.handles
    }

    /// Impulse buffered so far this step.
    pub fn pending_impulse(&self) -> Vec3 {
        self.impulse
    }

    /// Acceleration buffered so far this step.
    pub fn pending_acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Hand the buffered impulse and acceleration to Rapier.
    ///
    /// The acceleration replaces last step's force, so it only acts for the next world step.
    pub fn commit(self) {
        let Some(body) = self.world.rigid_body_set.get_mut(self.handles.body) else {
            return;
        };

        let velocity = *body.linvel() + vector![self.impulse.x, self.impulse.y, self.impulse.z];
        body.set_linvel(velocity, true);

        let force = self.acceleration * body.mass();
        body.reset_forces(true);
        body.add_force(vector![force.x, force.y, force.z], true);

        log::trace!(
            "commit {:?}: impulse {:?}, force {:?}",
            self.handles.body,
            self.impulse,
            force
        );
    }

    fn body(&self) -> Option<&RigidBody> {
        self.world.rigid_body_set.get(self.handles.body)
    }

    fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.rigid_body_set.get_mut(self.handles.body)
    }
}

impl SpatialQuery for CharacterBody<'_> {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.world
            .ray_cast(origin, direction, max_distance, mask, Some(self.handles.body))
            .map(ProbeHit::from)
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        self.world
            .sphere_cast(
                origin,
                radius,
                direction,
                max_distance,
                mask,
                Some(self.handles.body),
            )
            .map(ProbeHit::from)
    }
}

impl DynamicBody for CharacterBody<'_> {
    fn linear_velocity(&self) -> Vec3 {
        self.body()
            .map(|body| {
                let v = body.linvel();
                Vec3::new(v.x, v.y, v.z)
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        if let Some(body) = self.body_mut() {
            body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    fn bounds(&self) -> Bounds {
        self.world
            .collider_set
            .get(self.handles.collider)
            .map(|collider| {
                let aabb = collider.compute_aabb();
                Bounds::from_min_max(
                    Vec3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z),
                    Vec3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z),
                )
            })
            .unwrap_or_default()
    }

    fn orientation(&self) -> Quat {
        self.body()
            .map(|body| {
                let rot = body.rotation();
                Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
            })
            .unwrap_or(Quat::IDENTITY)
    }

    fn apply_impulse(&mut self, delta_velocity: Vec3) {
        self.impulse += delta_velocity;
    }

    fn apply_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration += acceleration;
    }

    fn uses_gravity(&self) -> bool {
        self.body().map_or(false, |body| body.gravity_scale() != 0.0)
    }

    fn set_uses_gravity(&mut self, enabled: bool) {
        if let Some(body) = self.body_mut() {
            body.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
        }
    }
}
