#![allow(dead_code)]

use localsim::nalgebra::{Isometry3, Vector3};
use localsim::slotmap::HopSlotMap;
use localsim::{Mobility, NativeBody, SceneHost, SimulationVolume, Teleport, VisualId};

/// Minimal stand-in for a host scene graph object.
pub struct TestVisual {
    pub pose: Isometry3<f32>,
    pub mobility: Mobility,
    pub simulating: bool,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub extent: Vector3<f32>,
    pub has_backend_body: bool,
    pub observed: bool,
    pub hidden: bool,
    pub shadow_of: Option<VisualId>,
    pub restored_pose: Option<Isometry3<f32>>,
    pub teleport_moves: usize,
}

#[derive(Default)]
pub struct TestScene {
    pub visuals: HopSlotMap<VisualId, TestVisual>,
    pub released_shadows: Vec<VisualId>,
}

impl TestScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        pose: Isometry3<f32>,
        mobility: Mobility,
        simulating: bool,
    ) -> VisualId {
        self.visuals.insert(TestVisual {
            pose,
            mobility,
            simulating,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            extent: Vector3::new(0.5, 0.5, 0.5),
            has_backend_body: true,
            observed: false,
            hidden: false,
            shadow_of: None,
            restored_pose: None,
            teleport_moves: 0,
        })
    }

    /// Movable and simulating: classifies as Dynamic.
    pub fn spawn_dynamic(&mut self) -> VisualId {
        self.spawn(Isometry3::identity(), Mobility::Movable, true)
    }

    /// Movable but not simulating: classifies as Kinematic.
    pub fn spawn_kinematic(&mut self) -> VisualId {
        self.spawn(Isometry3::identity(), Mobility::Movable, false)
    }

    /// Immovable: classifies as Static.
    pub fn spawn_static(&mut self) -> VisualId {
        self.spawn(Isometry3::identity(), Mobility::Static, false)
    }

    pub fn despawn(&mut self, visual: VisualId) {
        self.visuals.remove(visual);
    }

    pub fn shadow_of(&self, visual: VisualId) -> Option<VisualId> {
        self.visuals
            .iter()
            .find(|(_, v)| v.shadow_of == Some(visual))
            .map(|(id, _)| id)
    }

    /// Host-path move: updates the pose and fires the transform notification
    /// if the visual is observed, like a real scene graph would.
    pub fn move_visual(
        &mut self,
        volume: &mut SimulationVolume,
        visual: VisualId,
        pose: Isometry3<f32>,
    ) {
        self.visuals[visual].pose = pose;
        if self.visuals[visual].observed {
            volume.transform_updated(self, visual, Teleport::None);
        }
    }
}

impl SceneHost for TestScene {
    fn world_transform(&self, visual: VisualId) -> Option<Isometry3<f32>> {
        self.visuals.get(visual).map(|v| v.pose)
    }

    fn set_world_transform(&mut self, visual: VisualId, pose: Isometry3<f32>, teleport: Teleport) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.pose = pose;
            if teleport == Teleport::TeleportPhysics {
                v.teleport_moves += 1;
            }
        }
    }

    fn mobility(&self, visual: VisualId) -> Mobility {
        self.visuals
            .get(visual)
            .map(|v| v.mobility)
            .unwrap_or(Mobility::Static)
    }

    fn set_mobility(&mut self, visual: VisualId, mobility: Mobility) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.mobility = mobility;
        }
    }

    fn is_simulating(&self, visual: VisualId) -> bool {
        self.visuals.get(visual).map(|v| v.simulating).unwrap_or(false)
    }

    fn set_simulate_physics(&mut self, visual: VisualId, simulate: bool) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.simulating = simulate;
        }
    }

    fn linear_velocity(&self, visual: VisualId) -> Vector3<f32> {
        self.visuals
            .get(visual)
            .map(|v| v.linear_velocity)
            .unwrap_or_else(Vector3::zeros)
    }

    fn set_linear_velocity(&mut self, visual: VisualId, velocity: Vector3<f32>) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.linear_velocity = velocity;
        }
    }

    fn angular_velocity(&self, visual: VisualId) -> Vector3<f32> {
        self.visuals
            .get(visual)
            .map(|v| v.angular_velocity)
            .unwrap_or_else(Vector3::zeros)
    }

    fn set_angular_velocity(&mut self, visual: VisualId, velocity: Vector3<f32>) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.angular_velocity = velocity;
        }
    }

    fn bounds_extent(&self, visual: VisualId) -> Vector3<f32> {
        self.visuals
            .get(visual)
            .map(|v| v.extent)
            .unwrap_or_else(Vector3::zeros)
    }

    fn native_body(&self, visual: VisualId) -> Option<NativeBody> {
        self.visuals.get(visual).map(|_| NativeBody::default())
    }

    fn observe_transforms(&mut self, visual: VisualId, observe: bool) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.observed = observe;
        }
    }

    fn spawn_shadow(&mut self, visual: VisualId) -> Option<VisualId> {
        let source = self.visuals.get(visual)?;
        let clone = TestVisual {
            pose: source.pose,
            mobility: Mobility::Movable,
            simulating: false,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            extent: source.extent,
            has_backend_body: false,
            observed: false,
            hidden: true,
            shadow_of: Some(visual),
            restored_pose: None,
            teleport_moves: 0,
        };
        Some(self.visuals.insert(clone))
    }

    fn release_shadow(&mut self, shadow: VisualId) {
        self.visuals.remove(shadow);
        self.released_shadows.push(shadow);
    }

    fn terminate_body(&mut self, visual: VisualId) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.has_backend_body = false;
        }
    }

    fn restore_body(&mut self, visual: VisualId, pose: Isometry3<f32>) {
        if let Some(v) = self.visuals.get_mut(visual) {
            v.has_backend_body = true;
            v.pose = pose;
            v.restored_pose = Some(pose);
        }
    }
}

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_vec_close(actual: Vector3<f32>, expected: Vector3<f32>, eps: f32) {
    assert!(
        (actual - expected).norm() < eps,
        "expected {expected:?}, got {actual:?}"
    );
}
