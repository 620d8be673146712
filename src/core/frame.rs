use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// The volume's own placement in world space.
///
/// Admitted bodies are simulated relative to this frame; the host moves the
/// volume by mutating it. The frame also carries an independent
/// `local_rotation` used only to reorient velocities and gravity.
///
/// Rotation convention: on the way into the frame, a world-space direction is
/// first unrotated by the frame's own `rotation`, then rotated by
/// `local_rotation`. The way out is the exact inverse, so converting a vector
/// world -> local -> world returns the original.
#[derive(Debug, Clone)]
pub struct LocalFrame {
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
    scale: Vector3<f32>,
    local_rotation: UnitQuaternion<f32>,
}

impl Default for LocalFrame {
    fn default() -> Self {
        LocalFrame {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            local_rotation: UnitQuaternion::identity(),
        }
    }
}

impl LocalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.rotation = rotation;
    }

    /// Non-uniform scale of the volume. Applied to translation components
    /// only; rotations and velocities are never scaled.
    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    pub fn local_rotation(&self) -> UnitQuaternion<f32> {
        self.local_rotation
    }

    pub fn set_local_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.local_rotation = rotation;
    }

    /// The frame's world placement as an isometry, scale excluded.
    pub fn isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Re-expresses a world-space pose relative to the frame.
    pub fn pose_to_local(&self, world: &Isometry3<f32>) -> Isometry3<f32> {
        let mut local = self.isometry().inv_mul(world);
        local.translation.vector = local.translation.vector.component_div(&self.scale);
        local
    }

    /// Re-expresses a frame-relative pose in world space.
    pub fn pose_to_world(&self, local: &Isometry3<f32>) -> Isometry3<f32> {
        let mut scaled = *local;
        scaled.translation.vector = scaled.translation.vector.component_mul(&self.scale);
        self.isometry() * scaled
    }

    /// Converts a world-space velocity into frame space.
    pub fn velocity_to_local(&self, velocity: Vector3<f32>) -> Vector3<f32> {
        self.local_rotation * self.rotation.inverse_transform_vector(&velocity)
    }

    /// Converts a frame-space velocity back into world space.
    pub fn velocity_to_world(&self, velocity: Vector3<f32>) -> Vector3<f32> {
        self.rotation * self.local_rotation.inverse_transform_vector(&velocity)
    }

    /// Gravity uses the same composition as velocities.
    pub fn gravity_to_local(&self, gravity: Vector3<f32>) -> Vector3<f32> {
        self.velocity_to_local(gravity)
    }
}
