use nalgebra::{Isometry3, Vector3};
use rapier3d::prelude::*;

use crate::scene::NativeBody;

/// Opaque handle to a rigid body inside the local simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorHandle(pub(crate) RigidBodyHandle);

/// Opaque handle to a constraint inside the local simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointHandle(pub(crate) ImpulseJointHandle);

pub struct LocalSimulation {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: Box<dyn BroadPhase>,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for LocalSimulation {
    fn default() -> Self {
        LocalSimulation {
            rigid_body_set: RigidBodySet::default(),
            collider_set: ColliderSet::default(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::default(),
            island_manager: IslandManager::default(),
            broad_phase: Box::<DefaultBroadPhase>::default(),
            narrow_phase: NarrowPhase::default(),
            impulse_joint_set: ImpulseJointSet::default(),
            multibody_joint_set: MultibodyJointSet::default(),
            ccd_solver: CCDSolver::default(),
            query_pipeline: QueryPipeline::default(),
        }
    }
}

impl LocalSimulation {
    /// Advances the world by `dt` under the given (frame-space) gravity.
    pub fn step(&mut self, dt: f32, gravity: Vector3<f32>) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            self.broad_phase.as_mut(),
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(), // no hooks
            &(), // no events
        );
        self.query_pipeline.update(&self.collider_set)
    }

    /// `true` iff at least one actor is in the world.
    pub fn should_simulate(&self) -> bool {
        self.rigid_body_set.len() > 0
    }

    pub fn create_static_or_kinematic_actor(
        &mut self,
        body: &NativeBody,
        pose: Isometry3<f32>,
    ) -> ActorHandle {
        let rb = RigidBodyBuilder::kinematic_position_based()
            .position(pose)
            .build();
        self.insert_actor(rb, body)
    }

    pub fn create_dynamic_actor(&mut self, body: &NativeBody, pose: Isometry3<f32>) -> ActorHandle {
        let rb = RigidBodyBuilder::dynamic()
            .position(pose)
            .linear_damping(body.linear_damping)
            .angular_damping(body.angular_damping)
            .build();
        self.insert_actor(rb, body)
    }

    fn insert_actor(&mut self, rb: RigidBody, body: &NativeBody) -> ActorHandle {
        let handle = self.rigid_body_set.insert(rb);
        let collider = ColliderBuilder::new(body.shape.clone())
            .density(body.density)
            .friction(body.friction)
            .restitution(body.restitution)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        ActorHandle(handle)
    }

    pub fn remove_actor(&mut self, handle: ActorHandle) {
        self.rigid_body_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn create_joint(
        &mut self,
        joint: GenericJoint,
        a: ActorHandle,
        b: ActorHandle,
    ) -> JointHandle {
        JointHandle(self.impulse_joint_set.insert(a.0, b.0, joint, true))
    }

    pub fn remove_joint(&mut self, handle: JointHandle) {
        self.impulse_joint_set.remove(handle.0, true);
    }

    pub fn actor_pose(&self, handle: ActorHandle) -> Option<Isometry3<f32>> {
        self.rigid_body_set.get(handle.0).map(|rb| *rb.position())
    }

    /// Applies the pose immediately. For kinematic actors the next kinematic
    /// target is kept in sync so stepping does not rewind the body.
    pub fn set_actor_pose(&mut self, handle: ActorHandle, pose: Isometry3<f32>) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            rb.set_position(pose, true);
            if rb.is_kinematic() {
                rb.set_next_kinematic_position(pose);
            }
        }
    }

    pub fn actor_linvel(&self, handle: ActorHandle) -> Option<Vector3<f32>> {
        self.rigid_body_set.get(handle.0).map(|rb| *rb.linvel())
    }

    pub fn set_actor_linvel(&mut self, handle: ActorHandle, velocity: Vector3<f32>) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            rb.set_linvel(velocity, true);
        }
    }

    pub fn actor_angvel(&self, handle: ActorHandle) -> Option<Vector3<f32>> {
        self.rigid_body_set.get(handle.0).map(|rb| *rb.angvel())
    }

    pub fn set_actor_angvel(&mut self, handle: ActorHandle, velocity: Vector3<f32>) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            rb.set_angvel(velocity, true);
        }
    }

    /// Inverse mass of the actor. Zero for kinematic actors and dead handles.
    pub fn actor_inverse_mass(&self, handle: ActorHandle) -> f32 {
        let Some(rb) = self.rigid_body_set.get(handle.0) else {
            return 0.0;
        };
        if !rb.is_dynamic() {
            return 0.0;
        }
        let mass = rb.mass();
        if mass > 0.0 { 1.0 / mass } else { 0.0 }
    }
}
