use std::path::{Path, PathBuf};
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::{info, warn};

use super::loader::{AssetLoader, ModelHandle};
use crate::error::{ArError, Result};

/// Where the slot's model is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    /// Showing the placeholder; nothing requested yet.
    Placeholder,
    Loading,
    Ready,
    /// The last load failed; the placeholder stays in use.
    Failed,
}

/// Holds whatever model should be drawn right now.
///
/// The placeholder is drawn until a requested model resolves. Swapping the
/// model only changes what is drawn; placement state lives elsewhere and is
/// never touched.
pub struct ModelSlot {
    placeholder: ModelHandle,
    model: Option<ModelHandle>,
    pending: Option<(PathBuf, LocalBoxFuture<'static, Result<ModelHandle>>)>,
    last_error: Option<ArError>,
}

impl ModelSlot {
    pub fn new(placeholder: ModelHandle) -> Self {
        Self {
            placeholder,
            model: None,
            pending: None,
            last_error: None,
        }
    }

    /// Starts loading `path`. A load already in flight is abandoned.
    pub fn request(&mut self, loader: &dyn AssetLoader, path: &Path) {
        if let Some((previous, _)) = self.pending.take() {
            info!("Abandoning load of {}", previous.display());
        }
        self.pending = Some((path.to_path_buf(), loader.load(path)));
    }

    /// Drives the pending load without blocking. Returns `Some` on the poll
    /// where the load settles.
    pub fn poll(&mut self) -> Option<Result<()>> {
        let (path, request) = self.pending.as_mut()?;
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let Poll::Ready(result) = request.poll_unpin(&mut cx) else {
            return None;
        };
        let path = path.display().to_string();
        self.pending = None;
        Some(self.settle(&path, result))
    }

    /// Blocks until the pending load settles.
    pub fn wait(&mut self) -> Option<Result<()>> {
        let (path, request) = self.pending.take()?;
        let result = pollster::block_on(request);
        Some(self.settle(&path.display().to_string(), result))
    }

    fn settle(&mut self, path: &str, result: Result<ModelHandle>) -> Result<()> {
        match result {
            Ok(model) => {
                info!("Model {} ready, replacing placeholder", model.name);
                self.model = Some(model);
                self.last_error = None;
                Ok(())
            }
            Err(error) => {
                warn!("Keeping placeholder, {} failed to load: {}", path, error);
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// The loaded model, or the placeholder until one is available.
    pub fn current(&self) -> &ModelHandle {
        self.model.as_ref().unwrap_or(&self.placeholder)
    }

    pub fn status(&self) -> ModelStatus {
        if self.pending.is_some() {
            ModelStatus::Loading
        } else if self.model.is_some() {
            ModelStatus::Ready
        } else if self.last_error.is_some() {
            ModelStatus::Failed
        } else {
            ModelStatus::Placeholder
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.model.is_none()
    }

    pub fn last_error(&self) -> Option<&ArError> {
        self.last_error.as_ref()
    }
}
