use serde::{Deserialize, Serialize};

use crate::engine::graphics::{Material, Node, NodeKey, ObjectShape, Scene};
use crate::engine::state::ArState;
use crate::engine::xr::{InputSource, Pose, XrPlatform};

/// Where the placement pose comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementMode {
    /// The input source's world transform at select time.
    #[default]
    ControllerTransform,
    /// The first hit-test result along the input source's target ray.
    HitTest,
}

/// Places the configured object on the first valid select of a session.
#[derive(Debug, Clone)]
pub struct PlacementHandler {
    mode: PlacementMode,
    shape: ObjectShape,
    size: f32,
    material: Material,
}

impl PlacementHandler {
    pub fn new(mode: PlacementMode, shape: ObjectShape, size: f32, color: [f32; 3]) -> Self {
        Self {
            mode,
            shape,
            size,
            material: Material::standard(color),
        }
    }

    /// Pose for `source` under this handler's mode; `None` when the platform
    /// has nothing usable. Only the position is used, so only the position
    /// has to be finite.
    pub fn resolve_pose<P: XrPlatform>(&self, platform: &mut P, source: &InputSource) -> Option<Pose> {
        let pose = match self.mode {
            PlacementMode::ControllerTransform => source.target_ray,
            PlacementMode::HitTest => platform.hit_test(source),
        }?;
        pose.position.is_finite().then_some(pose)
    }

    /// Handle one select.
    ///
    /// Adds the object to `scene` and returns its key, or `None` when the
    /// state does not allow placement or no valid pose is available. Only the
    /// position is taken from the pose.
    pub fn place<P: XrPlatform>(
        &self,
        state: &ArState,
        platform: &mut P,
        source: &InputSource,
        scene: &mut Scene,
    ) -> Option<NodeKey> {
        if !state.can_place() {
            log::trace!("select ignored: {state:?}");
            return None;
        }

        let Some(pose) = self.resolve_pose(platform, source) else {
            log::debug!("select ignored: no valid pose ({:?})", self.mode);
            return None;
        };

        let node = Node::mesh("placed-object", self.shape.build(self.size), self.material)
            .with_position(pose.position);
        let key = scene.add(node);
        log::info!(
            "placed {:?} at {:?} (scene additions: {})",
            self.shape,
            pose.position,
            scene.additions()
        );
        Some(key)
    }
}
