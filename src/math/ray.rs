//! Ray casting against the placement plane.
//!
//! Screen positions are turned into world-space rays by unprojecting the near
//! and far clip points, the same way mouse picking works on desktop.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// An infinite plane given by a point on it and its unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl Plane {
    /// A horizontal plane at `height`, normal pointing up.
    pub fn horizontal(height: f32) -> Self {
        Self {
            point: Vector3::new(0.0, height, 0.0),
            normal: Vector3::unit_y(),
        }
    }

    /// Distance along `ray` to the plane, or `None` when the ray runs parallel
    /// to it or the plane lies behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = self.normal.dot(self.point - ray.origin) / denom;
        if t >= 0.0 {
            Some(t)
        } else {
            None
        }
    }

    pub fn intersection(&self, ray: &Ray) -> Option<Vector3<f32>> {
        self.intersect_ray(ray).map(|t| ray.point_at(t))
    }
}

/// Convert screen coordinates to a world-space ray.
///
/// `screen_pos` is in pixels with the origin at the top-left corner. Returns
/// `None` if the combined view-projection matrix is singular.
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Option<Ray> {
    let (x, y) = screen_pos;
    let (width, height) = screen_size;

    // Normalized device coordinates, Y flipped
    let ndc_x = (2.0 * x) / width - 1.0;
    let ndc_y = 1.0 - (2.0 * y) / height;

    let inv_view_proj = (projection * view).invert()?;

    let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
    let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

    let near_3d = world_near.truncate() / world_near.w;
    let far_3d = world_far.truncate() / world_far.w;

    Some(Ray::new(near_3d, far_3d - near_3d))
}
