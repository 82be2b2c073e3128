//! # Input Handling
//!
//! Turns raw pointer input into something the placement layer can consume.
//!
//! - [`TouchTracker`] keeps the set of fingers currently on the screen and
//!   recognises taps. It accepts winit window events directly, treating the
//!   left mouse button as a single finger on desktop.
//! - [`GestureRecognizer`] compares consecutive finger sets and emits
//!   incremental [`GestureEvent`]s: pans for one finger, pinch-scale and
//!   twist-rotate for two.
//!
//! Neither type knows anything about the 3D scene.

pub mod gesture;
pub mod touch;

pub use gesture::{GestureEvent, GestureRecognizer, TouchSampleSet};
pub use touch::{Tap, TouchPoint, TouchTracker, MOUSE_POINTER_ID};
pub use winit::event::TouchPhase;
