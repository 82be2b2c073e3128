use std::path::Path;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::{debug, info};

use super::geometry::{generate_cube, Aabb, GeometryData};
use crate::config::AssetConfig;
use crate::error::{ArError, Result};

/// A model the renderer can draw: one or more meshes plus the uniform scale
/// the scene applies on top of the placement transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    pub name: String,
    pub meshes: Vec<GeometryData>,
    pub bounds: Aabb,
    pub base_scale: f32,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>, meshes: Vec<GeometryData>, base_scale: f32) -> Self {
        let bounds = meshes
            .iter()
            .map(GeometryData::bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Aabb::from_vertices(&[]));
        Self {
            name: name.into(),
            meshes,
            bounds,
            base_scale,
        }
    }

    /// The stand-in cube shown while the real model is still loading.
    pub fn placeholder(size: f32) -> Self {
        Self::new("placeholder", vec![generate_cube(size)], 1.0)
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(GeometryData::triangle_count).sum()
    }
}

/// Asynchronously resolves a model path into a drawable handle.
///
/// The returned future must not borrow the loader; the viewer polls it from
/// the frame loop.
pub trait AssetLoader {
    fn load(&self, path: &Path) -> LocalBoxFuture<'static, Result<ModelHandle>>;
}

/// Loads Wavefront OBJ files from disk.
#[derive(Debug, Clone)]
pub struct ObjLoader {
    base_scale: f32,
}

impl ObjLoader {
    pub fn new(base_scale: f32) -> Self {
        Self { base_scale }
    }
}

impl From<&AssetConfig> for ObjLoader {
    fn from(config: &AssetConfig) -> Self {
        Self::new(config.model_scale)
    }
}

impl AssetLoader for ObjLoader {
    fn load(&self, path: &Path) -> LocalBoxFuture<'static, Result<ModelHandle>> {
        let path = path.to_path_buf();
        let base_scale = self.base_scale;
        async move { load_obj(&path, base_scale) }.boxed_local()
    }
}

fn load_obj(path: &Path, base_scale: f32) -> Result<ModelHandle> {
    let display = path.display().to_string();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| ArError::asset(display.clone(), e))?;

    if let Err(e) = materials {
        debug!("{}: no materials ({})", display, e);
    }

    let meshes: Vec<GeometryData> = models
        .iter()
        .map(|m| GeometryData::from_flat(&m.mesh.positions, &m.mesh.normals, m.mesh.indices.clone()))
        .filter(|g| !g.is_empty())
        .collect();
    if meshes.is_empty() {
        return Err(ArError::asset(display, "model contains no geometry"));
    }

    let name = models
        .iter()
        .map(|m| m.name.as_str())
        .find(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "model".to_string());

    let handle = ModelHandle::new(name, meshes, base_scale);
    info!(
        "Loaded {} ({} meshes, {} triangles)",
        display,
        handle.meshes.len(),
        handle.triangle_count()
    );
    Ok(handle)
}
