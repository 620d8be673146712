use nalgebra::{UnitQuaternion, Vector3, Vector4};

/// Sink for wireframe debug boxes. Purely observational; implementations
/// return nothing and failures are ignored.
pub trait DebugDraw {
    fn draw_box(
        &mut self,
        center: Vector3<f32>,
        half_extent: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
        color: Vector4<f32>,
        duration: f32,
        thickness: f32,
    );
}

/// Discards every draw call. The default sink of a volume.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDebugDraw;

impl DebugDraw for NoDebugDraw {
    fn draw_box(
        &mut self,
        _center: Vector3<f32>,
        _half_extent: Vector3<f32>,
        _rotation: UnitQuaternion<f32>,
        _color: Vector4<f32>,
        _duration: f32,
        _thickness: f32,
    ) {
    }
}
