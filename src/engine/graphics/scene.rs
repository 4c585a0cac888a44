//! Retained-mode scene graph.
//!
//! A flat slotmap of nodes; each node is either a mesh or a light. The AR
//! scene never nests objects, so there is no parent/child topology here.

use glam::{EulerRot, Mat4, Quat, Vec3};
use slotmap::{SlotMap, new_key_type};

use crate::engine::graphics::mesh::CpuMesh;

new_key_type! {
    pub struct NodeKey;
}

/// Position, Euler rotation (XYZ order, radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

/// Diffuse surface colour (linear RGB).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
}

impl Material {
    pub fn standard(color: [f32; 3]) -> Self {
        Self { color }
    }
}

/// Sky/ground gradient light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

impl HemisphereLight {
    /// Light reaching a surface facing `normal` (world space).
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        let t = 0.5 * normal.normalize_or_zero().y + 0.5;
        Vec3::from(self.ground_color).lerp(Vec3::from(self.sky_color), t) * self.intensity
    }

    /// Mean irradiance over a mesh's vertex normals after rotating them by
    /// `orientation`.
    pub fn mean_irradiance(&self, mesh: &CpuMesh, orientation: Quat) -> Vec3 {
        if mesh.vertices.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = mesh
            .vertices
            .iter()
            .map(|v| self.irradiance(orientation * Vec3::from(v.normal)))
            .sum();
        sum / mesh.vertices.len() as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh { geometry: CpuMesh, material: Material },
    HemisphereLight(HemisphereLight),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn mesh(name: impl Into<String>, geometry: CpuMesh, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::Mesh { geometry, material },
        }
    }

    pub fn hemisphere_light(name: impl Into<String>, light: HemisphereLight) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind: NodeKind::HemisphereLight(light),
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    #[cfg(test)]
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeKey, Node>,
    /// Insertion order, so draws are stable frame to frame.
    order: Vec<NodeKey>,
    /// Lifetime count of `add` calls.
    additions: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeKey {
        let key = self.nodes.insert(node);
        self.order.push(key);
        self.additions += 1;
        key
    }

    pub fn remove(&mut self, key: NodeKey) -> Option<Node> {
        let node = self.nodes.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(node)
    }

    #[cfg(test)]
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn additions(&self) -> u64 {
        self.additions
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.order
            .iter()
            .filter_map(|&k| self.nodes.get(k).map(|n| (k, n)))
    }

    #[cfg(test)]
    pub fn meshes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.iter().filter(|(_, n)| n.is_mesh())
    }

    pub fn hemisphere_light(&self) -> Option<(&Transform, &HemisphereLight)> {
        self.iter().find_map(|(_, n)| match &n.kind {
            NodeKind::HemisphereLight(light) => Some((&n.transform, light)),
            _ => None,
        })
    }
}
