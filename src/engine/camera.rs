use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use serde::{Deserialize, Serialize};

use crate::engine::xr::Pose;

/// Lens settings taken from config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            near: 0.01,
            far: 20.0,
        }
    }
}

/// Perspective camera (flat preview and XR viewer share it).
///
/// While a session is active the pose follows the platform's viewer pose;
/// otherwise it stays where bootstrap put it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub pose: Pose,
}

impl PerspectiveCamera {
    pub fn new(settings: CameraSettings, aspect: f32) -> Self {
        Self {
            fov_y_radians: settings.fov_y_degrees.to_radians(),
            aspect,
            near: settings.near,
            far: settings.far,
            pose: Pose::IDENTITY,
        }
    }

    /// Aspect from a pixel size; zero-height sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Right-handed projection, Vulkan-style [0, 1] depth, looking down -Z.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        self.pose.to_matrix().inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World-space ray through a pixel. Returns (origin, unit direction).
    pub fn screen_ray(&self, cursor_px: Vec2, viewport_px: Vec2) -> Option<(Vec3, Vec3)> {
        if viewport_px.x <= 0.0 || viewport_px.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            2.0 * cursor_px.x / viewport_px.x - 1.0,
            1.0 - 2.0 * cursor_px.y / viewport_px.y,
        );

        let inv = self.view_projection().inverse();
        let near = inv * ndc.extend(0.0).extend(1.0);
        let far = inv * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;

        let dir = (far - near).try_normalize()?;
        Some((self.pose.position, dir))
    }
}
