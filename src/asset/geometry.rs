//! # Procedural Geometry
//!
//! Meshes the viewer can draw without loading anything: the placeholder cube
//! shown until the real model arrives and the flat ring used as the reticle.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Matrix4, Transform, Vector3, Zero};

/// Triangle mesh ready for upload to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Per-vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_vertices(&self.vertices)
    }

    /// Builds a mesh from flat coordinate arrays as produced by OBJ parsers.
    /// Normals are computed per face when `normals` does not match
    /// `positions` one to one.
    pub fn from_flat(positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let vertices: Vec<[f32; 3]> = positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let normals = if !normals.is_empty() && normals.len() == positions.len() {
            normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect()
        } else {
            face_normals(&vertices, &indices)
        };
        Self {
            vertices,
            normals,
            indices,
        }
    }
}

/// Averages adjacent face normals onto each vertex.
fn face_normals(vertices: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vector3::<f32>::zero(); vertices.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let pa = Vector3::from(vertices[a]);
        let edge1 = Vector3::from(vertices[b]) - pa;
        let edge2 = Vector3::from(vertices[c]) - pa;
        let normal = edge1.cross(edge2);
        for index in [a, b, c] {
            accumulated[index] += normal;
        }
    }
    accumulated
        .into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// An empty vertex list yields a degenerate box at the origin.
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };
        let mut min = Vector3::from(*first);
        let mut max = min;
        for vertex in &vertices[1..] {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }
        Self { min, max }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Bounds of this box after `matrix`, re-fitted to the axes.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Aabb {
        let corners: Vec<[f32; 3]> = (0..8)
            .map(|i| {
                let corner = cgmath::Point3::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                );
                let p = matrix.transform_point(corner);
                [p.x, p.y, p.z]
            })
            .collect();
        Aabb::from_vertices(&corners)
    }
}

/// Cube of edge `size` resting on y = 0, so it sits on the placement plane.
pub fn generate_cube(size: f32) -> GeometryData {
    let h = size * 0.5;
    // (normal, tangent u, tangent v) per face; u x v = normal keeps CCW winding
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut data = GeometryData::new();
    for (normal, u, v) in faces {
        let n = Vector3::from(normal) * h;
        let u = Vector3::from(u) * h;
        let v = Vector3::from(v) * h;
        let base = data.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = n + u * su + v * sv;
            data.vertices.push([p.x, p.y + h, p.z]);
            data.normals.push(normal);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    data
}

/// Flat annulus in the XZ plane facing +Y.
pub fn generate_ring(inner_radius: f32, outer_radius: f32, segments: u32) -> GeometryData {
    let segments = segments.max(3);
    let mut data = GeometryData::new();

    for i in 0..segments {
        let theta = TAU * i as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        data.vertices.push([cos * inner_radius, 0.0, sin * inner_radius]);
        data.vertices.push([cos * outer_radius, 0.0, sin * outer_radius]);
        data.normals.push([0.0, 1.0, 0.0]);
        data.normals.push([0.0, 1.0, 0.0]);
    }

    for i in 0..segments {
        let inner = i * 2;
        let outer = inner + 1;
        let next_inner = ((i + 1) % segments) * 2;
        let next_outer = next_inner + 1;
        // counter-clockwise seen from above
        data.indices
            .extend_from_slice(&[inner, next_inner, outer, outer, next_inner, next_outer]);
    }
    data
}
