//! CPU-side procedural mesh generation.
//!
//! These meshes are authoring data; the drawing surface decides how (and
//! whether) to upload them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Vertex with object-space position and face normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CpuVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

/// CPU-side mesh data: an indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuMesh {
    pub vertices: Vec<CpuVertex>,
    pub indices: Vec<u32>,
}

impl CpuMesh {
    pub fn new(vertices: Vec<CpuVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Distance from the origin to the farthest vertex (object space).
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| Vec3::from(v.pos).length())
            .fold(0.0, f32::max)
    }
}

/// Shapes the placed object can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectShape {
    #[default]
    Cube,
    Tetrahedron,
}

impl ObjectShape {
    pub fn build(self, size: f32) -> CpuMesh {
        match self {
            ObjectShape::Cube => MeshFactory::cube(size),
            ObjectShape::Tetrahedron => MeshFactory::tetrahedron(size),
        }
    }
}

/// Procedural mesh constructors.
///
/// Triangles are counter-clockwise seen from outside. Vertices are split per
/// face so every face carries a flat normal.
pub struct MeshFactory;

impl MeshFactory {
    /// Cube centered at origin with edge length `size`.
    pub fn cube(size: f32) -> CpuMesh {
        let h = 0.5 * size;
        // (normal, four corners CCW seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, -1.0], [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]]),
            ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
            ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
            ([1.0, 0.0, 0.0], [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]]),
            ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
            ([0.0, 1.0, 0.0], [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            vertices.extend(corners.iter().map(|&pos| CpuVertex { pos, normal }));
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        CpuMesh::new(vertices, indices)
    }

    /// Regular tetrahedron centered at origin, circumradius `size / 2`.
    pub fn tetrahedron(size: f32) -> CpuMesh {
        let s = 0.5 * size / 3.0_f32.sqrt();
        let corners = [[s, s, s], [-s, -s, s], [-s, s, -s], [s, -s, -s]];
        let faces = [[0usize, 1, 3], [0, 2, 1], [0, 3, 2], [1, 2, 3]];

        let mut vertices = Vec::with_capacity(12);
        let mut indices = Vec::with_capacity(12);
        for face in faces {
            let [a, b, c] = face.map(|i| Vec3::from(corners[i]));
            let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
            let base = vertices.len() as u32;
            for p in [a, b, c] {
                vertices.push(CpuVertex {
                    pos: p.to_array(),
                    normal,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        CpuMesh::new(vertices, indices)
    }
}
