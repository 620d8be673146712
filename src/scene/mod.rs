//! The capability seam towards the host scene graph.
//!
//! The volume never owns visual representations. It refers to them through
//! [`VisualId`] and reaches them through [`SceneHost`], which the host
//! implements over whatever object model it has. Everything the volume needs
//! is listed on the trait; nothing else of the host is visible here.

use nalgebra::{Isometry3, Vector3};
use rapier3d::prelude::SharedShape;
use slotmap::new_key_type;

new_key_type! {
    /// Host-side identity of a visual representation.
    pub struct VisualId;
}

/// Host mobility classification of a visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mobility {
    Static,
    Movable,
}

/// How a transform write should be treated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Teleport {
    /// A plain move. Triggers transform-change notifications.
    #[default]
    None,
    /// Bypasses collision and velocity side effects of a normal move. Used
    /// when writing back poses the backend already resolved.
    TeleportPhysics,
}

/// Backend-consumable description of a visual's physics body.
///
/// The analog of handing the backend a native body reference: enough to
/// rebuild the body inside the local simulation.
#[derive(Debug, Clone)]
pub struct NativeBody {
    pub shape: SharedShape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl NativeBody {
    pub fn new(shape: SharedShape) -> Self {
        NativeBody {
            shape,
            density: 1.0,
            friction: 0.999,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn cuboid(half_extents: Vector3<f32>) -> Self {
        Self::new(SharedShape::cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
        ))
    }
}

impl Default for NativeBody {
    fn default() -> Self {
        Self::cuboid(Vector3::new(0.5, 0.5, 0.5))
    }
}

/// Operations the volume consumes from the host scene graph.
///
/// All calls are synchronous and run on the thread that owns the volume. A
/// host that cannot resolve a [`VisualId`] answers `None`/defaults; the
/// volume treats that as a precondition violation on admission and skips the
/// visual everywhere else.
pub trait SceneHost {
    /// World-space pose of the visual, if the host knows it.
    fn world_transform(&self, visual: VisualId) -> Option<Isometry3<f32>>;

    fn set_world_transform(&mut self, visual: VisualId, pose: Isometry3<f32>, teleport: Teleport);

    fn mobility(&self, visual: VisualId) -> Mobility;

    fn set_mobility(&mut self, visual: VisualId, mobility: Mobility);

    /// Whether the host's own backend is simulating this visual.
    fn is_simulating(&self, visual: VisualId) -> bool;

    fn set_simulate_physics(&mut self, visual: VisualId, simulate: bool);

    fn linear_velocity(&self, visual: VisualId) -> Vector3<f32>;

    fn set_linear_velocity(&mut self, visual: VisualId, velocity: Vector3<f32>);

    fn angular_velocity(&self, visual: VisualId) -> Vector3<f32>;

    fn set_angular_velocity(&mut self, visual: VisualId, velocity: Vector3<f32>);

    /// Half extents of the visual's bounding box, for debug drawing.
    fn bounds_extent(&self, visual: VisualId) -> Vector3<f32>;

    /// Body description the local simulation can rebuild the visual from.
    fn native_body(&self, visual: VisualId) -> Option<NativeBody>;

    /// Toggles transform-change notifications for the visual. While observed,
    /// the host forwards plain moves to
    /// [`SimulationVolume::transform_updated`](crate::volume::SimulationVolume::transform_updated).
    fn observe_transforms(&mut self, visual: VisualId, observe: bool);

    /// Spawns a hidden, independently movable mirror of the visual for
    /// dual-scene mode.
    fn spawn_shadow(&mut self, visual: VisualId) -> Option<VisualId>;

    fn release_shadow(&mut self, shadow: VisualId);

    /// Removes the visual's body from the host's own physics scene.
    fn terminate_body(&mut self, visual: VisualId);

    /// Re-initializes the visual's body in the host's physics scene at the
    /// given world pose.
    fn restore_body(&mut self, visual: VisualId, pose: Isometry3<f32>);
}
