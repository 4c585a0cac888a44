use std::f32::consts::TAU;

use crate::engine::EngineResult;
use crate::engine::camera::PerspectiveCamera;
use crate::engine::graphics::{Renderer, Scene};
use crate::engine::state::ArState;
use crate::engine::xr::Pose;

/// Per-frame work: spin the placed object, then draw once.
#[derive(Debug, Clone, Copy)]
pub struct AnimationLoop {
    spin_step: f32,
}

impl AnimationLoop {
    pub fn new(spin_step: f32) -> Self {
        Self { spin_step }
    }

    pub fn tick(
        &self,
        state: &ArState,
        viewer: Option<Pose>,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
        renderer: &mut Renderer,
    ) -> EngineResult<()> {
        if let Some(pose) = viewer.and_then(Pose::normalized) {
            camera.pose = pose;
        }

        if let Some(node) = state.placed_node().and_then(|key| scene.get_mut(key)) {
            let rotation = &mut node.transform.rotation;
            rotation.x = (rotation.x + self.spin_step).rem_euclid(TAU);
            rotation.y = (rotation.y + self.spin_step).rem_euclid(TAU);
        }

        renderer.draw(scene, camera)
    }
}
