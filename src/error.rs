//! # Error Types
//!
//! Every failure in the viewer is reported as a value. Nothing here is meant to
//! abort a live camera session: the UI layer inspects the error, shows a retry
//! affordance if [`ArError::is_recoverable`] says so, and carries on.

use thiserror::Error;

/// Failures reported by the platform tracking collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("immersive AR is not supported on this device")]
    Unsupported,

    #[error("camera or motion-sensor permission was denied")]
    PermissionDenied,

    #[error("the user cancelled the session request")]
    UserCancelled,

    #[error("platform failure: {0}")]
    Failed(String),
}

/// Failures while turning the rendered frame into an exportable image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("no active AR session to capture")]
    NoActiveSession,

    #[error("renderer could not provide a frame: {0}")]
    FrameUnavailable(String),

    #[error("frame of {width}x{height} does not match its {len} bytes of pixel data")]
    InvalidFrame { width: u32, height: u32, len: usize },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("could not write capture: {0}")]
    Io(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArError {
    #[error("AR session unavailable: {0}")]
    SessionUnavailable(#[from] PlatformError),

    #[error("failed to load model {path}: {message}")]
    AssetLoadFailed { path: String, message: String },

    #[error("{operation} is not valid while {state}")]
    InvalidStateOperation {
        operation: &'static str,
        state: String,
    },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ArError {
    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Debug) -> Self {
        Self::InvalidStateOperation {
            operation,
            state: format!("{:?}", state),
        }
    }

    pub fn asset<S: Into<String>, M: std::fmt::Display>(path: S, message: M) -> Self {
        Self::AssetLoadFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Whether the user can reasonably retry the operation that produced this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ArError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, ArError>;
