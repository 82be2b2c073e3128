//! # Session Lifecycle
//!
//! The immersive tracking session is the single most error-prone resource in
//! the viewer: it holds the camera and motion sensors. [`SessionManager`] is
//! the only code that acquires or releases it. Every other component reacts
//! to the [`SessionEvent`]s the manager publishes.
//!
//! ## States
//!
//! ```text
//! Idle --start--> Requesting --setup resolved--> Active --end--> Ended --> Idle
//!                     |                                              ^
//!                     +--setup failed / end (cancel)-----------------+
//! ```
//!
//! Setup runs asynchronously: session, `viewer` space, hit-test source, then
//! `local` space. The frame loop keeps ticking throughout, polling the
//! manager once per frame.
//!
//! ## Collaborators
//!
//! The host platform is abstracted behind [`TrackingPlatform`] and
//! [`TrackingSession`]. [`SimulatedPlatform`] implements both for desktop
//! previews and tests.

pub mod manager;
pub mod platform;
pub mod simulated;

pub use manager::{EndReason, SessionEvent, SessionManager, SessionState};
pub use platform::{
    HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionOptions, TrackingPlatform,
    TrackingSession,
};
pub use simulated::SimulatedPlatform;
