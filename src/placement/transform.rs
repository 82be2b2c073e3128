use cgmath::{Matrix4, Quaternion, Rad, Rotation3, Vector3};

use crate::math::{normalize_angle, Plane, Pose};

/// Where the placed object sits: on the detected plane, uniformly scaled,
/// turned about the vertical axis only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    /// `y` is the placement plane height and never changes after confirm.
    pub position: Vector3<f32>,
    /// Multiplier on the model's authored size.
    pub scale: f32,
    /// Radians about +Y, kept in `[0, 2π)`.
    pub yaw: f32,
}

impl ObjectTransform {
    pub fn from_pose(pose: &Pose, scale: f32) -> Self {
        Self {
            position: pose.position,
            scale,
            yaw: pose.yaw(),
        }
    }

    pub fn plane_height(&self) -> f32 {
        self.position.y
    }

    pub fn plane(&self) -> Plane {
        Plane::horizontal(self.plane_height())
    }

    /// Moves within the placement plane.
    pub fn translate(&mut self, dx: f32, dz: f32) {
        self.position.x += dx;
        self.position.z += dz;
    }

    pub fn rotate(&mut self, delta_radians: f32) {
        self.yaw = normalize_angle(self.yaw + delta_radians);
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Rad(self.yaw))
    }

    /// Model matrix: translate * yaw * scale. `model_scale` is the asset's own
    /// normalisation factor, applied on top of the user scale.
    pub fn to_matrix(&self, model_scale: f32) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_y(Rad(self.yaw))
            * Matrix4::from_scale(self.scale * model_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_from_pose_takes_position_and_yaw() {
        let pose = Pose::on_floor(Vector3::new(0.3, -1.1, -0.8), 0.9);
        let transform = ObjectTransform::from_pose(&pose, 1.0);
        assert_eq!(transform.position, pose.position);
        assert!((transform.yaw - 0.9).abs() < 1e-4);
        assert_eq!(transform.plane_height(), -1.1);
    }

    #[test]
    fn test_rotate_wraps() {
        let mut transform = ObjectTransform::from_pose(&Pose::on_floor(Vector3::unit_y(), 0.0), 1.0);
        transform.rotate(-FRAC_PI_2);
        assert!((transform.yaw - 3.0 * FRAC_PI_2).abs() < 1e-5);
        transform.rotate(TAU * 3.0);
        assert!(transform.yaw >= 0.0 && transform.yaw < TAU);
    }

    #[test]
    fn test_matrix_applies_scale_then_yaw_then_translation() {
        let transform = ObjectTransform {
            position: Vector3::new(1.0, 0.0, 0.0),
            scale: 2.0,
            yaw: FRAC_PI_2,
        };
        // Local +X, scaled by 2 * 0.5, turned a quarter about +Y lands on -Z
        let local = Vector4::new(1.0, 0.0, 0.0, 1.0);
        let world = transform.to_matrix(0.5) * local;
        assert!((world.truncate() - Vector3::new(1.0, 0.0, -1.0)).magnitude() < 1e-5);
    }
}
