//! # Object Placement
//!
//! The placement state machine and the transform it owns.
//!
//! ```text
//! Searching --confirm(pose)--> Placed
//! Placed    --reset/end------> Searching
//! ```
//!
//! [`PlacementController`] is the only writer of [`ObjectTransform`]. While
//! searching there is no transform at all; the renderer shows the tracker's
//! reticle instead.

pub mod controller;
pub mod transform;

pub use controller::{PlacementController, PlacementState, ViewBasis};
pub use transform::ObjectTransform;
