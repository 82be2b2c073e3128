//! Screenshot export.
//!
//! Capturing is only meaningful while a session is running. A failed capture
//! leaves the previous result in place so the UI can keep showing it while
//! offering a retry.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use log::{info, warn};

use crate::error::CaptureError;
use crate::render::SceneRenderer;
use crate::session::SessionState;

/// An RGBA8 snapshot of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Increments with every successful capture.
    pub sequence: u64,
}

impl CapturedImage {
    pub fn from_rgba(image: RgbaImage, sequence: u64) -> Result<Self, CaptureError> {
        let (width, height) = image.dimensions();
        let pixels = image.into_raw();
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize * 4 {
            return Err(CaptureError::InvalidFrame {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            sequence,
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, CaptureError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(&self.pixels, self.width, self.height, ColorType::Rgba8)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Writes the PNG into `dir`, creating the directory if needed.
    pub fn save_to_dir(&self, dir: &Path, file_name: &str) -> Result<PathBuf, CaptureError> {
        let bytes = self.encode_png()?;
        fs::create_dir_all(dir).map_err(|e| CaptureError::Io(e.to_string()))?;
        let path = dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| CaptureError::Io(format!("{}: {}", path.display(), e)))?;
        info!("Capture #{} written to {}", self.sequence, path.display());
        Ok(path)
    }
}

#[derive(Debug, Default)]
pub struct CaptureService {
    last: Option<CapturedImage>,
    taken: u64,
}

impl CaptureService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current frame back from `renderer`.
    pub fn capture(
        &mut self,
        session: SessionState,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<&CapturedImage, CaptureError> {
        if session != SessionState::Active {
            return Err(CaptureError::NoActiveSession);
        }
        let frame = renderer.canvas_image().inspect_err(|e| warn!("Capture failed: {}", e))?;
        let image = CapturedImage::from_rgba(frame, self.taken + 1)?;
        self.taken += 1;
        info!("Captured {}x{} frame", image.width, image.height);
        let stored = self.last.insert(image);
        Ok(&*stored)
    }

    pub fn last_capture(&self) -> Option<&CapturedImage> {
        self.last.as_ref()
    }

    pub fn captures_taken(&self) -> u64 {
        self.taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SceneView;
    use image::Rgba;

    /// Hands back a fixed frame or a scripted failure.
    struct StaticRenderer {
        frame: Result<RgbaImage, CaptureError>,
        reads: u32,
    }

    impl StaticRenderer {
        fn solid(width: u32, height: u32) -> Self {
            Self {
                frame: Ok(RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))),
                reads: 0,
            }
        }
    }

    impl SceneRenderer for StaticRenderer {
        fn render_frame(&mut self, _scene: &SceneView) {}

        fn canvas_image(&mut self) -> Result<RgbaImage, CaptureError> {
            self.reads += 1;
            self.frame.clone()
        }
    }

    #[test]
    fn test_capture_requires_active_session() {
        let mut service = CaptureService::new();
        let mut renderer = StaticRenderer::solid(4, 4);
        for state in [SessionState::Idle, SessionState::Requesting, SessionState::Ended] {
            let result = service.capture(state, &mut renderer);
            assert_eq!(result.unwrap_err(), CaptureError::NoActiveSession);
        }
        assert_eq!(renderer.reads, 0);
        assert!(service.last_capture().is_none());
    }

    #[test]
    fn test_capture_stores_last_result() {
        let mut service = CaptureService::new();
        let mut renderer = StaticRenderer::solid(3, 2);
        let image = service.capture(SessionState::Active, &mut renderer).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.pixels.len(), 24);
        assert_eq!(image.sequence, 1);

        service.capture(SessionState::Active, &mut renderer).unwrap();
        assert_eq!(service.last_capture().unwrap().sequence, 2);
        assert_eq!(service.captures_taken(), 2);
    }

    #[test]
    fn test_failed_capture_keeps_previous() {
        let mut service = CaptureService::new();
        let mut renderer = StaticRenderer::solid(2, 2);
        service.capture(SessionState::Active, &mut renderer).unwrap();

        renderer.frame = Err(CaptureError::FrameUnavailable("context lost".to_string()));
        let err = service.capture(SessionState::Active, &mut renderer).unwrap_err();
        assert!(matches!(err, CaptureError::FrameUnavailable(_)));
        assert_eq!(service.last_capture().unwrap().sequence, 1);

        renderer.frame = Ok(RgbaImage::new(0, 0));
        let err = service.capture(SessionState::Active, &mut renderer).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidFrame { width: 0, .. }));
        assert_eq!(service.captures_taken(), 1);
    }

    #[test]
    fn test_png_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let image = CapturedImage::from_rgba(
            RgbaImage::from_pixel(5, 7, Rgba([200, 100, 50, 255])),
            1,
        )
        .unwrap();

        let bytes = image.encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let path = image
            .save_to_dir(&dir.path().join("shots"), "ar-capture.png")
            .unwrap();
        assert!(path.ends_with("shots/ar-capture.png"));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
