//! Platform tracking collaborator interface.

use futures::future::LocalBoxFuture;

use crate::error::PlatformError;
use crate::math::Pose;

/// Coordinate frames a session can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSpaceKind {
    /// Attached to the device; hit-test rays are cast from here.
    Viewer,
    /// Fixed near the session origin; poses are reported in here.
    Local,
}

impl ReferenceSpaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Local => "local",
        }
    }
}

/// Opaque handle to a reference space issued by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSpace {
    pub kind: ReferenceSpaceKind,
    pub id: u32,
}

/// Opaque handle to a hit-test source issued by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestSource {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub required_features: Vec<String>,
    pub optional_features: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            required_features: vec!["hit-test".to_string()],
            optional_features: Vec::new(),
        }
    }
}

impl SessionOptions {
    pub fn requires(&self, feature: &str) -> bool {
        self.required_features.iter().any(|f| f == feature)
    }

    /// Required or optional.
    pub fn enables(&self, feature: &str) -> bool {
        self.requires(feature) || self.optional_features.iter().any(|f| f == feature)
    }
}

/// Entry point into the host's AR stack.
pub trait TrackingPlatform {
    fn is_supported(&self) -> bool;

    /// Starts acquiring an immersive session. The returned future must not
    /// borrow the platform; it may resolve frames later.
    fn request_session(
        &mut self,
        options: &SessionOptions,
    ) -> LocalBoxFuture<'static, Result<Box<dyn TrackingSession>, PlatformError>>;
}

/// A live immersive session.
pub trait TrackingSession {
    fn request_reference_space(
        &mut self,
        kind: ReferenceSpaceKind,
    ) -> LocalBoxFuture<'static, Result<ReferenceSpace, PlatformError>>;

    fn request_hit_test_source(
        &mut self,
        space: &ReferenceSpace,
    ) -> LocalBoxFuture<'static, Result<HitTestSource, PlatformError>>;

    /// Surface hits for the current frame, nearest first, expressed in `space`.
    fn hit_test_results(&self, source: &HitTestSource, space: &ReferenceSpace) -> Vec<Pose>;

    /// Where the device is in `space` this frame, if tracking is available.
    fn viewer_pose(&self, space: &ReferenceSpace) -> Option<Pose>;

    /// True once the platform has ended the session on its own, e.g. the user
    /// left immersive mode through system UI.
    fn is_ended(&self) -> bool;

    /// Releases camera and sensor access.
    fn end(&mut self) -> Result<(), PlatformError>;
}
