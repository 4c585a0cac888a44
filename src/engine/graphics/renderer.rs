use glam::Vec3;

use crate::engine::camera::PerspectiveCamera;
use crate::engine::graphics::scene::{NodeKind, Scene};
use crate::engine::graphics::surface::{DrawItem, DrawList, Surface};
use crate::engine::xr::{ReferenceSpaceType, SessionId};
use crate::engine::{EngineError, EngineResult};

/// Renderer-side immersive configuration.
///
/// `enabled` stays set once a session has been bound, matching how the
/// renderer keeps its XR path warm between sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XrBinding {
    pub enabled: bool,
    reference_space: ReferenceSpaceType,
    session: Option<SessionId>,
}

impl XrBinding {
    pub fn bind(&mut self, session: SessionId, reference_space: ReferenceSpaceType) {
        self.enabled = true;
        self.reference_space = reference_space;
        self.session = Some(session);
    }

    pub fn unbind(&mut self) {
        self.session = None;
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn reference_space(&self) -> ReferenceSpaceType {
        self.reference_space
    }

    pub fn is_presenting(&self) -> bool {
        self.enabled && self.session.is_some()
    }
}

pub struct Renderer {
    surface: Option<Box<dyn Surface>>,
    pub xr: XrBinding,
    size: (u32, u32),
    frames_drawn: u64,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("attached", &self.surface.is_some())
            .field("xr", &self.xr)
            .field("size", &self.size)
            .field("frames_drawn", &self.frames_drawn)
            .finish()
    }
}

impl Renderer {
    /// Attach to `surface` and size it.
    pub fn new(mut surface: Box<dyn Surface>, width: u32, height: u32) -> Self {
        surface.resize(width, height);
        Self {
            surface: Some(surface),
            xr: XrBinding::default(),
            size: (width, height),
            frames_drawn: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        self.surface.is_none()
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    /// Build this frame's draw list from the scene.
    pub fn build_draw_list(&self, scene: &Scene, camera: &PerspectiveCamera) -> DrawList {
        let light = scene.hemisphere_light().map(|(_, light)| *light);
        let items = scene
            .iter()
            .filter_map(|(_, node)| match &node.kind {
                NodeKind::Mesh { geometry, material } => {
                    let ambient = light
                        .map(|l| l.mean_irradiance(geometry, node.transform.orientation()))
                        .unwrap_or(Vec3::ZERO)
                        * Vec3::from(material.color);
                    Some(DrawItem {
                        name: node.name.clone(),
                        model: node.transform.model_matrix(),
                        color: material.color,
                        ambient: ambient.to_array(),
                        index_count: geometry.index_count(),
                        vertex_count: geometry.vertex_count(),
                        bounding_radius: geometry.bounding_radius(),
                    })
                }
                NodeKind::HemisphereLight(_) => None,
            })
            .collect();

        DrawList {
            view_projection: camera.view_projection(),
            clear_alpha: if self.xr.is_presenting() { 0.0 } else { 1.0 },
            reference_space: self.xr.is_presenting().then(|| self.xr.reference_space()),
            light,
            items,
        }
    }

    /// One draw of `scene` from `camera`.
    pub fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> EngineResult<()> {
        if self.surface.is_none() {
            return Err(EngineError::SurfaceReleased);
        }
        let frame = self.build_draw_list(scene, camera);
        if let Some(surface) = self.surface.as_mut() {
            surface.present(&frame)?;
        }
        self.frames_drawn += 1;
        Ok(())
    }

    /// Release the drawing surface. Later draws fail with `SurfaceReleased`.
    pub fn dispose(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        self.xr.unbind();
    }
}
