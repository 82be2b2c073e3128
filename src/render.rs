//! # Rendering Boundary
//!
//! The viewer does not rasterize anything itself. Each frame it assembles a
//! [`SceneView`] describing what should be visible and hands it to a
//! [`SceneRenderer`]. The capture service reads finished frames back through
//! the same trait.
//!
//! Matrices follow OpenGL clip-space conventions (NDC depth in `[-1, 1]`);
//! GPU backends apply their own depth correction when uploading.
//!
//! [`HeadlessRenderer`] is a CPU point renderer for desktop previews and
//! tests. It projects mesh vertices and splats them into an RGBA buffer.

use cgmath::{perspective, Matrix4, Point3, Rad, SquareMatrix, Vector3, Vector4};
use image::{Rgba, RgbaImage};
use log::debug;

use crate::asset::{GeometryData, ModelHandle};
use crate::config::ViewportConfig;
use crate::error::CaptureError;
use crate::math::Pose;

pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 100.0;

/// Camera data laid out for a uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Eye position in homogenous coordinates for 16 byte alignment.
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view: &Matrix4<f32>, projection: &Matrix4<f32>) -> Self {
        let eye = view
            .invert()
            .map(|inverse| inverse.w)
            .unwrap_or_else(|| Vector4::new(0.0, 0.0, 0.0, 1.0));
        Self {
            view_position: eye.into(),
            view_proj: (projection * view).into(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0, 0.0, 0.0, 1.0],
            view_proj: Matrix4::identity().into(),
        }
    }
}

pub fn projection_matrix(viewport: &ViewportConfig) -> Matrix4<f32> {
    perspective(
        Rad(viewport.fovy_radians),
        viewport.aspect(),
        Z_NEAR,
        Z_FAR,
    )
}

/// View used while no session is running: a fixed camera looking at the
/// model standing at the origin.
pub fn preview_view() -> Matrix4<f32> {
    Matrix4::look_at_rh(
        Point3::new(0.0, 0.35, 0.7),
        Point3::new(0.0, 0.1, 0.0),
        Vector3::unit_y(),
    )
}

/// Projects a world-space point to pixel coordinates, origin top-left.
/// Points behind the camera or outside the depth range yield `None`.
pub fn project_point(
    view_proj: &Matrix4<f32>,
    point: Vector3<f32>,
    screen_size: (f32, f32),
) -> Option<(f32, f32)> {
    let clip = view_proj * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(-1.0..=1.0).contains(&ndc.z) {
        return None;
    }
    let (width, height) = screen_size;
    Some(((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height))
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    /// Reticle placement; `None` hides it.
    pub reticle: Option<Matrix4<f32>>,
    pub reticle_mesh: &'a GeometryData,
    pub model: &'a ModelHandle,
    /// Model placement; `None` hides the model.
    pub model_matrix: Option<Matrix4<f32>>,
}

impl SceneView<'_> {
    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform::new(&self.view, &self.projection)
    }

    pub fn is_empty(&self) -> bool {
        self.reticle.is_none() && self.model_matrix.is_none()
    }
}

/// The drawing collaborator.
pub trait SceneRenderer {
    fn render_frame(&mut self, scene: &SceneView);

    /// Reads back the most recently rendered frame.
    fn canvas_image(&mut self) -> Result<RgbaImage, CaptureError>;

    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Camera feed stand-in.
const BACKGROUND: Rgba<u8> = Rgba([38, 41, 46, 255]);
const RETICLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MODEL_COLOR: Rgba<u8> = Rgba([232, 156, 62, 255]);

pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    frame: Option<RgbaImage>,
    /// Camera of the last rendered frame.
    camera: CameraUniform,
    frames_rendered: u64,
    next_read_error: Option<CaptureError>,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            frame: None,
            camera: CameraUniform::default(),
            frames_rendered: 0,
            next_read_error: None,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn camera(&self) -> &CameraUniform {
        &self.camera
    }

    /// Makes the next [`canvas_image`](SceneRenderer::canvas_image) call fail.
    pub fn fail_next_read(&mut self, error: CaptureError) {
        self.next_read_error = Some(error);
    }

    fn splat(
        image: &mut RgbaImage,
        view_proj: &Matrix4<f32>,
        model: &Matrix4<f32>,
        mesh: &GeometryData,
        color: Rgba<u8>,
    ) {
        let size = (image.width() as f32, image.height() as f32);
        let mvp = view_proj * model;
        for vertex in &mesh.vertices {
            let Some((x, y)) = project_point(&mvp, Vector3::from(*vertex), size) else {
                continue;
            };
            let (cx, cy) = (x.floor() as i64, y.floor() as i64);
            for py in cy - 1..=cy + 1 {
                for px in cx - 1..=cx + 1 {
                    let inside = px >= 0
                        && py >= 0
                        && (px as u32) < image.width()
                        && (py as u32) < image.height();
                    if inside {
                        image.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn render_frame(&mut self, scene: &SceneView) {
        let mut image = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        self.camera = scene.camera_uniform();
        let view_proj = Matrix4::from(self.camera.view_proj);

        if let Some(model_matrix) = scene.model_matrix {
            for mesh in &scene.model.meshes {
                Self::splat(&mut image, &view_proj, &model_matrix, mesh, MODEL_COLOR);
            }
        }
        if let Some(reticle) = scene.reticle {
            Self::splat(&mut image, &view_proj, &reticle, scene.reticle_mesh, RETICLE_COLOR);
        }

        self.frame = Some(image);
        self.frames_rendered += 1;
    }

    fn canvas_image(&mut self) -> Result<RgbaImage, CaptureError> {
        if let Some(error) = self.next_read_error.take() {
            return Err(error);
        }
        self.frame
            .clone()
            .ok_or_else(|| CaptureError::FrameUnavailable("no frame rendered yet".to_string()))
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!("Headless surface resized to {}x{}", width, height);
        self.width = width.max(1);
        self.height = height.max(1);
        self.frame = None;
    }
}

/// Model matrix for a reticle lying on the surface described by `pose`.
pub fn reticle_matrix(pose: &Pose) -> Matrix4<f32> {
    pose.to_matrix()
}
