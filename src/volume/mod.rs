//! The [`SimulationVolume`] owns the local reference frame, the membership
//! records and the per-tick synchronization pipeline.
//!
//! Admission classifies each visual as static, kinematic or dynamic and
//! mirrors it into the local simulation. Every tick the volume drains
//! deferred removals, steps the simulation with frame-space gravity and polls
//! simulated poses back onto the visuals. Removals are never applied
//! synchronously: `remove_*` calls may arrive mid-iteration (for example from
//! a transform notification fired during the volume's own tick), so they are
//! queued and committed at the start of the next tick.

pub mod constraint;

pub use constraint::*;

use bon::Builder;
use log::{debug, trace};
use nalgebra::{Isometry3, UnitQuaternion, Vector3, Vector4};
use slotmap::HopSlotMap;
use smallvec::SmallVec;
use snafu::{OptionExt, Snafu};
use std::mem;

use crate::core::{BodyKey, BodyRecord, BodyType, JointKey, JointRecord, LocalFrame};
use crate::debug::{DebugDraw, NoDebugDraw};
use crate::physics::LocalSimulation;
use crate::scene::{Mobility, SceneHost, Teleport, VisualId};

const EARTH_GRAVITY: f32 = 9.81;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum VolumeError {
    #[snafu(display(
        "SimulationVolume: visual {visual:?} is unknown to the host or has no physics body"
    ))]
    InvalidVisual { visual: VisualId },
}

/// Configuration of a [`SimulationVolume`], supplied by the host.
#[derive(Debug, Clone, Builder)]
pub struct VolumeSettings {
    #[builder(default = Vector3::new(0.0, -EARTH_GRAVITY, 0.0))]
    pub gravity: Vector3<f32>,
    /// Initial velocity reorientation of the frame (see
    /// [`LocalFrame::local_rotation`]).
    #[builder(default = UnitQuaternion::identity())]
    pub local_rotation: UnitQuaternion<f32>,
    /// Convert velocities between world and frame space on admission and
    /// removal of dynamic bodies.
    #[builder(default = true)]
    pub convert_velocity: bool,
    #[builder(default)]
    pub profiles: Vec<ConstraintProfile>,
    #[builder(default = false)]
    pub show_debug: bool,
    #[builder(default = Vector4::new(0.0, 1.0, 0.2, 1.0))]
    pub simulated_color: Vector4<f32>,
    #[builder(default = Vector4::new(1.0, 0.6, 0.0, 1.0))]
    pub kinematic_color: Vector4<f32>,
    /// Lifetime of each debug box, in seconds.
    #[builder(default = 0.0)]
    pub debug_duration: f32,
    #[builder(default = 1.0)]
    pub debug_thickness: f32,
    #[builder(default = 1.0)]
    pub debug_kinematic_thickness: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A movable volume that simulates a subset of the host's objects in its own
/// local physics world.
pub struct SimulationVolume {
    frame: LocalFrame,
    sim: LocalSimulation,
    bodies: HopSlotMap<BodyKey, BodyRecord>,
    joints: HopSlotMap<JointKey, JointRecord>,
    bodies_to_remove: SmallVec<[BodyKey; 8]>,
    joints_to_remove: SmallVec<[JointKey; 4]>,
    removal_pending: bool,
    settings: VolumeSettings,
    debug_draw: Box<dyn DebugDraw>,
    static_bodies: usize,
    kinematic_active: usize,
    dynamic_active: usize,
    joints_active: usize,
}

impl Default for SimulationVolume {
    fn default() -> Self {
        Self::new(VolumeSettings::default())
    }
}

impl SimulationVolume {
    pub fn new(settings: VolumeSettings) -> Self {
        let mut frame = LocalFrame::new();
        frame.set_local_rotation(settings.local_rotation);

        SimulationVolume {
            frame,
            sim: LocalSimulation::default(),
            bodies: HopSlotMap::with_key(),
            joints: HopSlotMap::with_key(),
            bodies_to_remove: SmallVec::new(),
            joints_to_remove: SmallVec::new(),
            removal_pending: false,
            settings,
            debug_draw: Box::new(NoDebugDraw),
            static_bodies: 0,
            kinematic_active: 0,
            dynamic_active: 0,
            joints_active: 0,
        }
    }

    /// Replaces the default no-op diagnostics sink.
    pub fn with_debug_draw(mut self, sink: impl DebugDraw + 'static) -> Self {
        self.debug_draw = Box::new(sink);
        self
    }

    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    /// The host moves the volume by mutating the frame.
    pub fn frame_mut(&mut self) -> &mut LocalFrame {
        &mut self.frame
    }

    pub fn settings(&self) -> &VolumeSettings {
        &self.settings
    }

    pub fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.settings.gravity = gravity;
    }

    pub fn set_local_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.frame.set_local_rotation(rotation);
    }

    pub fn simulation(&self) -> &LocalSimulation {
        &self.sim
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, visual: VisualId) -> bool {
        self.find_body(visual).is_some()
    }

    pub fn body_type_of(&self, visual: VisualId) -> Option<BodyType> {
        self.find_body(visual).map(|key| self.bodies[key].body_type)
    }

    /// World-space pose of an admitted body's handle.
    pub fn body_world_pose(&self, visual: VisualId) -> Option<Isometry3<f32>> {
        let key = self.find_body(visual)?;
        let pose = self.sim.actor_pose(self.bodies[key].handle)?;
        Some(self.frame.pose_to_world(&pose))
    }

    /// World-space linear velocity of an admitted body's handle.
    pub fn body_linear_velocity(&self, visual: VisualId) -> Option<Vector3<f32>> {
        let key = self.find_body(visual)?;
        let velocity = self.sim.actor_linvel(self.bodies[key].handle)?;
        Some(self.frame.velocity_to_world(velocity))
    }

    /// World-space angular velocity of an admitted body's handle.
    pub fn body_angular_velocity(&self, visual: VisualId) -> Option<Vector3<f32>> {
        let key = self.find_body(visual)?;
        let velocity = self.sim.actor_angvel(self.bodies[key].handle)?;
        Some(self.frame.velocity_to_world(velocity))
    }

    pub fn static_bodies(&self) -> usize {
        self.static_bodies
    }

    pub fn kinematic_active(&self) -> usize {
        self.kinematic_active
    }

    pub fn dynamic_active(&self) -> usize {
        self.dynamic_active
    }

    pub fn joints_active(&self) -> usize {
        self.joints_active
    }

    pub fn removal_pending(&self) -> bool {
        self.removal_pending
    }

    /// Admits a visual into the local simulation.
    ///
    /// Returns `Ok(false)` without touching any state if the visual is
    /// already a member. With `dual_scene` a hidden shadow visual is spawned
    /// to display simulated results while the original stays untouched in
    /// world space; without it the original's backend body leaves the host
    /// scene until removal.
    pub fn add_body(
        &mut self,
        host: &mut dyn SceneHost,
        visual: VisualId,
        dual_scene: bool,
    ) -> Result<bool, VolumeError> {
        if self.contains(visual) {
            return Ok(false);
        }

        let world_pose = host
            .world_transform(visual)
            .context(InvalidVisualErr { visual })?;
        let native = host
            .native_body(visual)
            .context(InvalidVisualErr { visual })?;

        // default is Dynamic, the other checks override it
        let mut body_type = BodyType::Dynamic;
        if host.mobility(visual) == Mobility::Movable && !host.is_simulating(visual) {
            body_type = BodyType::Kinematic;
        }
        if host.mobility(visual) == Mobility::Static {
            body_type = BodyType::Static;
        }

        let shadow = if dual_scene {
            Some(
                host.spawn_shadow(visual)
                    .context(InvalidVisualErr { visual })?,
            )
        } else {
            None
        };

        let relative_pose = self.frame.pose_to_local(&world_pose);

        // later pose writes require a movable visual
        host.set_mobility(visual, Mobility::Movable);

        let handle = match body_type {
            BodyType::Kinematic => {
                // follow host moves that happen between our own ticks
                host.observe_transforms(visual, true);
                self.kinematic_active += 1;
                self.sim.create_static_or_kinematic_actor(&native, relative_pose)
            }
            BodyType::Static => {
                self.static_bodies += 1;
                self.sim.create_static_or_kinematic_actor(&native, relative_pose)
            }
            BodyType::Dynamic => {
                self.dynamic_active += 1;

                // capture before the host body is touched
                let linear = host.linear_velocity(visual);
                let angular = host.angular_velocity(visual);

                host.set_simulate_physics(visual, false);

                let handle = self.sim.create_dynamic_actor(&native, relative_pose);
                if self.settings.convert_velocity {
                    self.sim
                        .set_actor_linvel(handle, self.frame.velocity_to_local(linear));
                    self.sim
                        .set_actor_angvel(handle, self.frame.velocity_to_local(angular));
                }
                handle
            }
        };

        if shadow.is_none() {
            host.terminate_body(visual);
        }

        self.bodies.insert(BodyRecord {
            visual,
            shadow,
            handle,
            body_type,
        });

        debug!("admitted {visual:?} into local simulation as {body_type:?}");
        Ok(true)
    }

    /// Queues a member for removal. The removal is committed at the start of
    /// the next [`tick`](Self::tick); until then the body stays a member.
    /// Joints referencing the body are queued along with it and destroyed
    /// first.
    pub fn remove_body(&mut self, visual: VisualId) -> bool {
        let Some(key) = self.find_body(visual) else {
            return false;
        };
        if self.bodies_to_remove.contains(&key) {
            return false;
        }

        for (joint_key, joint) in &self.joints {
            if joint.links(key) && !self.joints_to_remove.contains(&joint_key) {
                self.joints_to_remove.push(joint_key);
            }
        }

        self.bodies_to_remove.push(key);
        self.removal_pending = true;
        true
    }

    /// Creates a constraint between two members using the referenced profile.
    /// Returns `false` if either visual is not a member.
    pub fn add_constraint(
        &mut self,
        visual_a: VisualId,
        visual_b: VisualId,
        profile_index: i32,
    ) -> bool {
        let (Some(key_a), Some(key_b)) = (self.find_body(visual_a), self.find_body(visual_b))
        else {
            return false;
        };
        if key_a == key_b {
            return false;
        }

        let handle_a = self.bodies[key_a].handle;
        let handle_b = self.bodies[key_b].handle;
        let (Some(pose_a), Some(pose_b)) =
            (self.sim.actor_pose(handle_a), self.sim.actor_pose(handle_b))
        else {
            return false;
        };

        // joint frame: pose of B relative to A
        let relative = pose_a.inv_mul(&pose_b);
        let average_inverse_mass = (self.sim.actor_inverse_mass(handle_a)
            + self.sim.actor_inverse_mass(handle_b))
            / 2.0;

        let profile = self.constraint_profile(profile_index);
        let joint = profile.build_joint(relative, average_inverse_mass);
        let handle = self.sim.create_joint(joint, handle_a, handle_b);

        self.joints.insert(JointRecord {
            bodies: (key_a, key_b),
            handle,
        });
        self.joints_active += 1;

        debug!("constrained {visual_a:?} to {visual_b:?} with profile '{}'", profile.name);
        true
    }

    /// Queues the constraint between the two visuals (in either order) for
    /// removal. Returns `true` iff a matching joint was found and queued.
    pub fn remove_constraint(&mut self, visual_a: VisualId, visual_b: VisualId) -> bool {
        let (Some(key_a), Some(key_b)) = (self.find_body(visual_a), self.find_body(visual_b))
        else {
            return false;
        };
        let Some(joint_key) = self
            .joints
            .iter()
            .find(|(_, joint)| joint.links_pair(key_a, key_b))
            .map(|(key, _)| key)
        else {
            return false;
        };
        if self.joints_to_remove.contains(&joint_key) {
            return false;
        }

        self.joints_to_remove.push(joint_key);
        self.removal_pending = true;
        true
    }

    /// Resolves a constraint profile by index. Negative indices clamp to the
    /// first entry; indices beyond the table fall back to the default
    /// profile. Never fails.
    pub fn constraint_profile(&self, index: i32) -> ConstraintProfile {
        let index = index.max(0) as usize;
        self.settings
            .profiles
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    /// Advances the volume by one frame: commits deferred removals, steps the
    /// local simulation with frame-space gravity, then polls results back
    /// onto the visuals.
    pub fn tick(&mut self, host: &mut dyn SceneHost, dt: f32) {
        self.drain_removals(host);

        if self.sim.should_simulate() {
            let gravity = self.frame.gravity_to_local(self.settings.gravity);
            self.sim.step(dt, gravity);
        }

        self.poll_updates(host);
    }

    /// Entry point for the host's transform-change notifications.
    ///
    /// Only plain moves of movable members are forwarded into the local
    /// simulation; physics-driven and teleport updates come back through the
    /// polling pass instead. The membership lookup is the filter, so hosts
    /// may notify for any visual they observe.
    pub fn transform_updated(
        &mut self,
        host: &mut dyn SceneHost,
        visual: VisualId,
        teleport: Teleport,
    ) {
        if teleport != Teleport::None || host.mobility(visual) != Mobility::Movable {
            return;
        }
        let Some(key) = self.find_body(visual) else {
            return;
        };
        let Some(world_pose) = host.world_transform(visual) else {
            return;
        };

        let handle = self.bodies[key].handle;
        self.sim
            .set_actor_pose(handle, self.frame.pose_to_local(&world_pose));
        trace!("pushed host move of {visual:?} into local simulation");

        if self.settings.show_debug {
            if let Some(pose) = self.sim.actor_pose(handle) {
                self.debug_draw.draw_box(
                    pose.translation.vector,
                    host.bounds_extent(visual),
                    pose.rotation,
                    self.settings.kinematic_color,
                    self.settings.debug_duration,
                    self.settings.debug_kinematic_thickness,
                );
            }
        }
    }

    /// Commits all queued removals: joints first, then bodies. Runs at most
    /// once per tick, before the simulation step.
    fn drain_removals(&mut self, host: &mut dyn SceneHost) {
        if !self.removal_pending {
            return;
        }

        let joints = mem::take(&mut self.joints_to_remove);
        for joint_key in joints {
            let Some(joint) = self.joints.remove(joint_key) else {
                continue;
            };
            self.sim.remove_joint(joint.handle);
            self.joints_active -= 1;
        }

        let bodies = mem::take(&mut self.bodies_to_remove);
        for body_key in bodies {
            let Some(record) = self.bodies.remove(body_key) else {
                continue;
            };

            let local_pose = self
                .sim
                .actor_pose(record.handle)
                .unwrap_or_else(Isometry3::identity);
            let world_pose = self.frame.pose_to_world(&local_pose);

            // without a shadow the original's backend body was terminated on
            // admission and has to be rebuilt where the simulation left it
            if record.shadow.is_none() {
                host.restore_body(record.visual, world_pose);
            }

            match record.body_type {
                BodyType::Static => {
                    host.set_mobility(record.visual, Mobility::Static);
                    self.static_bodies -= 1;
                }
                BodyType::Kinematic => {
                    host.set_mobility(record.visual, Mobility::Movable);
                    host.observe_transforms(record.visual, false);
                    self.kinematic_active -= 1;
                }
                BodyType::Dynamic => {
                    let linear = self
                        .sim
                        .actor_linvel(record.handle)
                        .unwrap_or_else(Vector3::zeros);
                    let angular = self
                        .sim
                        .actor_angvel(record.handle)
                        .unwrap_or_else(Vector3::zeros);

                    host.set_mobility(record.visual, Mobility::Movable);
                    host.set_simulate_physics(record.visual, true);
                    if self.settings.convert_velocity {
                        host.set_linear_velocity(
                            record.visual,
                            self.frame.velocity_to_world(linear),
                        );
                        host.set_angular_velocity(
                            record.visual,
                            self.frame.velocity_to_world(angular),
                        );
                    }
                    self.dynamic_active -= 1;
                }
            }

            if let Some(shadow) = record.shadow {
                host.release_shadow(shadow);
            }

            self.sim.remove_actor(record.handle);
            debug!("released {:?} from local simulation", record.visual);
        }

        self.removal_pending = false;
    }

    /// Reconciles the local simulation with the host: simulated poses go out
    /// to the visuals, kinematic visuals' poses come in to their handles.
    fn poll_updates(&mut self, host: &mut dyn SceneHost) {
        for (_, record) in &self.bodies {
            match record.body_type {
                BodyType::Static | BodyType::Dynamic => {
                    let Some(pose) = self.sim.actor_pose(record.handle) else {
                        continue;
                    };
                    // the backend already resolved collision for this pose
                    host.set_world_transform(
                        record.display_target(),
                        self.frame.pose_to_world(&pose),
                        Teleport::TeleportPhysics,
                    );
                }
                BodyType::Kinematic => {
                    let Some(world_pose) = host.world_transform(record.visual) else {
                        continue;
                    };
                    self.sim
                        .set_actor_pose(record.handle, self.frame.pose_to_local(&world_pose));
                }
            }

            if self.settings.show_debug {
                if let Some(pose) = self.sim.actor_pose(record.handle) {
                    self.debug_draw.draw_box(
                        pose.translation.vector,
                        host.bounds_extent(record.visual),
                        pose.rotation,
                        self.settings.simulated_color,
                        self.settings.debug_duration,
                        self.settings.debug_thickness,
                    );
                }
            }
        }
    }

    fn find_body(&self, visual: VisualId) -> Option<BodyKey> {
        self.bodies
            .iter()
            .find(|(_, record)| record.visual == visual)
            .map(|(key, _)| key)
    }
}
