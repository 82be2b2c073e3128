use cgmath::{InnerSpace, Matrix3, Matrix4, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};
use std::f32::consts::{PI, TAU};

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angle difference into `(-π, π]` so a crossing of the atan2 seam
/// reads as the short way round.
pub fn wrap_angle_delta(delta: f32) -> f32 {
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// A rigid transform reported by the platform: where a surface was hit, or
/// where the viewer is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    /// Unit quaternion.
    pub orientation: Quaternion<f32>,
}

impl Default for Pose {
    /// At the origin, looking down -Z.
    fn default() -> Self {
        Self::from_position(Vector3::new(0.0, 0.0, 0.0))
    }
}

impl Pose {
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self::new(position, Quaternion::new(1.0, 0.0, 0.0, 0.0))
    }

    /// A pose on a horizontal surface facing `yaw` radians about +Y.
    pub fn on_floor(position: Vector3<f32>, yaw: f32) -> Self {
        Self::new(position, Quaternion::from_angle_y(Rad(yaw)))
    }

    /// Builds a pose from a rigid transform matrix. Any scale baked into the
    /// rotation columns is discarded.
    pub fn from_matrix(matrix: &Matrix4<f32>) -> Self {
        let position = matrix.w.truncate();
        let rotation = Matrix3::from_cols(
            safe_normalize(matrix.x.truncate(), Vector3::unit_x()),
            safe_normalize(matrix.y.truncate(), Vector3::unit_y()),
            safe_normalize(matrix.z.truncate(), Vector3::unit_z()),
        );
        Self::new(position, Quaternion::from(rotation))
    }

    /// Builds a pose from the column-major float array platforms hand out for
    /// hit-test and viewer transforms.
    pub fn from_column_major(values: [f32; 16]) -> Self {
        let matrix = Matrix4::new(
            values[0], values[1], values[2], values[3], values[4], values[5], values[6],
            values[7], values[8], values[9], values[10], values[11], values[12], values[13],
            values[14], values[15],
        );
        Self::from_matrix(&matrix)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from(self.orientation)
    }

    /// The inverse transform, for building view matrices from a viewer pose.
    pub fn inverse_matrix(&self) -> Matrix4<f32> {
        self.to_matrix().invert().unwrap_or_else(Matrix4::identity)
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation * Vector3::unit_x()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation * Vector3::unit_y()
    }

    /// The direction the pose looks along (-Z in its own frame).
    pub fn forward(&self) -> Vector3<f32> {
        self.orientation * -Vector3::unit_z()
    }

    /// Rotation about +Y in `[0, 2π)`, taken from the local X axis projected
    /// onto the horizontal plane. Falls back to the local Z axis when X points
    /// straight up or down.
    pub fn yaw(&self) -> f32 {
        let x_axis = self.right();
        if x_axis.x.hypot(x_axis.z) > 1e-4 {
            return normalize_angle((-x_axis.z).atan2(x_axis.x));
        }
        let z_axis = self.orientation * Vector3::unit_z();
        normalize_angle(z_axis.x.atan2(z_axis.z))
    }

    /// Blends toward `target`: position linearly, orientation by normalized
    /// lerp along the shorter arc. `t = 1` returns `target`.
    pub fn interpolate(&self, target: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        let position = self.position + (target.position - self.position) * t;
        let mut goal = target.orientation;
        if self.orientation.dot(goal) < 0.0 {
            goal = -goal;
        }
        Pose::new(position, self.orientation.nlerp(goal, t))
    }
}

fn safe_normalize(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > f32::EPSILON {
        v.normalize()
    } else {
        fallback
    }
}
