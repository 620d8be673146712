use slotmap::new_key_type;

use crate::physics::{ActorHandle, JointHandle};
use crate::scene::VisualId;

new_key_type! {
    pub struct BodyKey;
    pub struct JointKey;
}

/// Classification of an admitted body within the local simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Immovable collider. Never receives pose pushes after creation.
    Static,
    /// Driven by the host. The handle follows the visual, never the reverse.
    Kinematic,
    /// Fully simulated. The handle's pose is written back to the visual.
    Dynamic,
}

/// Per-object record binding a visual representation to its actor handle.
///
/// The handle is owned exclusively by the record and destroyed exactly once,
/// during the deferred removal drain.
pub struct BodyRecord {
    pub visual: VisualId,
    /// Present in dual-scene mode: a hidden mirror that shows simulated
    /// results while the original stays untouched in world space.
    pub shadow: Option<VisualId>,
    pub handle: ActorHandle,
    pub body_type: BodyType,
}

impl BodyRecord {
    /// The visual that simulated poses are written onto.
    pub fn display_target(&self) -> VisualId {
        self.shadow.unwrap_or(self.visual)
    }
}

/// Binds two body records through a backend constraint.
pub struct JointRecord {
    pub bodies: (BodyKey, BodyKey),
    pub handle: JointHandle,
}

impl JointRecord {
    pub fn links(&self, body: BodyKey) -> bool {
        self.bodies.0 == body || self.bodies.1 == body
    }

    pub fn links_pair(&self, a: BodyKey, b: BodyKey) -> bool {
        (self.bodies.0 == a && self.bodies.1 == b) || (self.bodies.0 == b && self.bodies.1 == a)
    }
}
