//! # Surface Tracking
//!
//! Maintains the reticle: the candidate pose where the model would land if
//! the user tapped now. Hit-testing only matters before placement, so the
//! tracker goes idle once an object is placed.


pub use hit_test::HitTestTracker;
