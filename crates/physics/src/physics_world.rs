//! Physics world management with Rapier3D.

use engine_core::{Transform, Vec3};
use glam::Quat;
use rapier3d::na::{Isometry3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::collision::CollisionGroup;

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles of a spawned character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterHandles {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for probes. Needed after adding colliders before the first step.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Spawn a capsule character driven by the locomotion solver.
    ///
    /// Rotations are locked so the capsule stays upright, and CCD is on so a
    /// fast body that slips past the tunneling guard is still caught.
    pub fn add_character(
        &mut self,
        position: Vec3,
        half_height: f32,
        radius: f32,
        groups: InteractionGroups,
    ) -> CharacterHandles {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let body = self.rigid_body_set.insert(rigid_body);

        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .collision_groups(groups)
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, body, &mut self.rigid_body_set);

        CharacterHandles { body, collider }
    }

    /// Add a ground plane collider (flat half-space at height `y`).
    pub fn add_ground_plane(&mut self, y: f32) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .translation(vector![0.0, y, 0.0])
            .collision_groups(CollisionGroup::environment())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a static cuboid. No parent body; the collider is fixed in the world.
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation: Quat,
        half_extents: Vec3,
        groups: InteractionGroups,
    ) -> ColliderHandle {
        let position = Isometry3::from_parts(
            vector![translation.x, translation.y, translation.z].into(),
            UnitQuaternion::from_quaternion(rapier3d::na::Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            )),
        );
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(position)
            .collision_groups(groups)
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a ramp rising along +X by `angle_degrees`, centered at `center`.
    pub fn add_ramp(
        &mut self,
        center: Vec3,
        angle_degrees: f32,
        half_extents: Vec3,
    ) -> ColliderHandle {
        let rotation = Quat::from_rotation_z(angle_degrees.to_radians());
        let groups = if angle_degrees.abs() > 60.0 {
            CollisionGroup::wall()
        } else {
            CollisionGroup::environment()
        };
        self.add_static_cuboid(center, rotation, half_extents, groups)
    }

    /// Add a heightfield collider centered at (`offset_x`, `offset_z`).
    /// - `heights`: row-major height values in world Y (index = row * ncols + col).
    /// - `size_x`, `size_z`: total extent in world units.
    ///
    /// Panics if the grid is smaller than 2x2 or `heights` is too short.
    pub fn add_terrain_heightfield(
        &mut self,
        heights: &[f32],
        nrows: usize,
        ncols: usize,
        size_x: f32,
        size_z: f32,
        offset_x: f32,
        offset_z: f32,
    ) -> ColliderHandle {
        assert!(
            nrows >= 2 && ncols >= 2,
            "Terrain heightfield must have at least 2 rows and columns"
        );
        assert!(
            heights.len() >= nrows * ncols,
            "Heights slice too small for {}x{} grid",
            nrows,
            ncols
        );

        let heights_matrix = DMatrix::from_fn(nrows, ncols, |i, j| heights[i * ncols + j] as Real);
        let scale = vector![size_x, 1.0, size_z];

        let collider = ColliderBuilder::heightfield(heights_matrix, scale)
            .translation(vector![offset_x, 0.0, offset_z])
            .collision_groups(CollisionGroup::environment())
            .build();
        self.collider_set.insert(collider)
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            Transform::from_position_rotation(
                Vec3::new(pos.x, pos.y, pos.z),
                Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
            )
        })
    }

    /// Set the yaw of a character body (rotations are locked, so this is the only way it turns).
    pub fn set_body_yaw(&mut self, handle: RigidBodyHandle, yaw: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let axisangle = Vector3::y() * yaw;
            body.set_rotation(UnitQuaternion::new(axisangle), true);
        }
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_is_upright_capsule() {
        let mut world = PhysicsWorld::new();
        let handles =
            world.add_character(Vec3::new(0.0, 3.0, 0.0), 0.5, 0.4, CollisionGroup::player());
        let body = &world.rigid_body_set[handles.body];
        assert!(body.is_dynamic());
        assert!(body.is_ccd_enabled());
        assert_eq!(body.colliders(), &[handles.collider]);
    }

    #[test]
    fn set_body_yaw_rotates_forward() {
        let mut world = PhysicsWorld::new();
        let handles = world.add_character(Vec3::ZERO, 0.5, 0.4, CollisionGroup::player());
        world.set_body_yaw(handles.body, std::f32::consts::FRAC_PI_2);
        let transform = world.get_body_transform(handles.body).unwrap();
        assert!((transform.forward() - Vec3::NEG_X).length() < 1e-4);
    }

    #[test]
    fn removed_body_has_no_transform() {
        let mut world = PhysicsWorld::new();
        let handles = world.add_character(Vec3::ZERO, 0.5, 0.4, CollisionGroup::drone());
        world.remove_body(handles.body);
        assert!(world.get_body_transform(handles.body).is_none());
    }
}
