mod common;

use common::assert_vec_close;
use localsim::LocalFrame;
use localsim::nalgebra::{Isometry3, UnitQuaternion, Vector3};

fn twisted_frame() -> LocalFrame {
    let mut frame = LocalFrame::new();
    frame.set_position(Vector3::new(4.0, -1.0, 2.5));
    frame.set_rotation(UnitQuaternion::from_euler_angles(0.2, 0.4, 0.6));
    frame.set_scale(Vector3::new(2.0, 1.0, 0.5));
    frame.set_local_rotation(UnitQuaternion::from_euler_angles(0.0, 0.9, 0.3));
    frame
}

#[test]
fn identity_frame_is_transparent() {
    let frame = LocalFrame::new();
    let pose = Isometry3::translation(1.0, 2.0, 3.0);

    let local = frame.pose_to_local(&pose);
    assert_vec_close(local.translation.vector, pose.translation.vector, 1e-6);

    let velocity = Vector3::new(3.0, -1.0, 0.5);
    assert_vec_close(frame.velocity_to_local(velocity), velocity, 1e-6);
}

#[test]
fn pose_round_trips_through_a_twisted_frame() {
    let frame = twisted_frame();
    let pose = Isometry3::from_parts(
        Vector3::new(-3.0, 7.0, 1.0).into(),
        UnitQuaternion::from_euler_angles(1.0, 0.2, -0.4),
    );

    let round_tripped = frame.pose_to_world(&frame.pose_to_local(&pose));
    assert_vec_close(round_tripped.translation.vector, pose.translation.vector, 1e-4);
    assert!(round_tripped.rotation.angle_to(&pose.rotation) < 1e-4);
}

#[test]
fn velocity_round_trips_through_a_twisted_frame() {
    let frame = twisted_frame();
    let velocity = Vector3::new(10.0, -2.0, 4.0);

    let round_tripped = frame.velocity_to_world(frame.velocity_to_local(velocity));
    assert_vec_close(round_tripped, velocity, 1e-4);
}

#[test]
fn frame_scale_applies_to_translations_only() {
    let mut frame = LocalFrame::new();
    frame.set_scale(Vector3::new(2.0, 2.0, 2.0));

    let world = Isometry3::translation(2.0, 0.0, 0.0);
    let local = frame.pose_to_local(&world);
    assert_vec_close(local.translation.vector, Vector3::new(1.0, 0.0, 0.0), 1e-6);

    // velocities are never scaled
    let velocity = Vector3::new(2.0, 0.0, 0.0);
    assert_vec_close(frame.velocity_to_local(velocity), velocity, 1e-6);
}

#[test]
fn gravity_composition_matches_the_documented_convention() {
    let frame = twisted_frame();
    let gravity = Vector3::new(0.0, -9.81, 0.0);

    let expected =
        frame.local_rotation() * frame.rotation().inverse_transform_vector(&gravity);
    assert_vec_close(frame.gravity_to_local(gravity), expected, 1e-6);
}
