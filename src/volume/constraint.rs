use nalgebra::Isometry3;
use rapier3d::prelude::{GenericJoint, GenericJointBuilder, JointAxesMask, JointAxis};

/// Named constraint configuration preset.
///
/// A profile locks a set of joint axes and optionally drives the free ones
/// with a position motor. Drive strength is specified per unit of mass and
/// scaled by the constrained pair's average inverse mass when the joint is
/// built.
#[derive(Debug, Clone)]
pub struct ConstraintProfile {
    pub name: String,
    pub locked_axes: JointAxesMask,
    pub linear_stiffness: f32,
    pub linear_damping: f32,
    pub angular_stiffness: f32,
    pub angular_damping: f32,
}

impl Default for ConstraintProfile {
    fn default() -> Self {
        ConstraintProfile {
            name: "Default".to_string(),
            locked_axes: JointAxesMask::LOCKED_FIXED_AXES,
            linear_stiffness: 0.0,
            linear_damping: 0.0,
            angular_stiffness: 0.0,
            angular_damping: 0.0,
        }
    }
}

const LINEAR_AXES: [(JointAxis, JointAxesMask); 3] = [
    (JointAxis::LinX, JointAxesMask::LIN_X),
    (JointAxis::LinY, JointAxesMask::LIN_Y),
    (JointAxis::LinZ, JointAxesMask::LIN_Z),
];

const ANGULAR_AXES: [(JointAxis, JointAxesMask); 3] = [
    (JointAxis::AngX, JointAxesMask::ANG_X),
    (JointAxis::AngY, JointAxesMask::ANG_Y),
    (JointAxis::AngZ, JointAxesMask::ANG_Z),
];

impl ConstraintProfile {
    /// A fully locked joint under the given name.
    pub fn fixed(name: impl Into<String>) -> Self {
        ConstraintProfile {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builds the backend joint. `frame` is the pose of the second body
    /// relative to the first; `average_inverse_mass` weights the drive
    /// motors so heavier pairs get proportionally stronger motors.
    pub fn build_joint(
        &self,
        frame: Isometry3<f32>,
        average_inverse_mass: f32,
    ) -> GenericJoint {
        let mut joint = GenericJointBuilder::new(self.locked_axes)
            .local_frame1(frame)
            .build();

        let mass_scale = if average_inverse_mass > 0.0 {
            average_inverse_mass.recip()
        } else {
            1.0
        };

        if self.linear_stiffness > 0.0 {
            for (axis, mask) in LINEAR_AXES {
                if !self.locked_axes.contains(mask) {
                    joint.set_motor_position(
                        axis,
                        0.0,
                        self.linear_stiffness * mass_scale,
                        self.linear_damping * mass_scale,
                    );
                }
            }
        }
        if self.angular_stiffness > 0.0 {
            for (axis, mask) in ANGULAR_AXES {
                if !self.locked_axes.contains(mask) {
                    joint.set_motor_position(
                        axis,
                        0.0,
                        self.angular_stiffness * mass_scale,
                        self.angular_damping * mass_scale,
                    );
                }
            }
        }

        joint
    }
}
