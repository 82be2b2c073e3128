//! # Math Utilities
//!
//! Value types shared by the tracking, placement, and input layers, built on
//! `cgmath`. Coordinates are right-handed with +Y up, matching the platform's
//! `local` reference space: horizontal surfaces lie in the XZ plane and yaw is
//! rotation about +Y.

pub mod pose;
pub mod ray;

pub use pose::{normalize_angle, wrap_angle_delta, Pose};
pub use ray::{screen_to_ray, Plane, Ray};
