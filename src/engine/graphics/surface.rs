//! Drawing surfaces the renderer presents into.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::engine::EngineResult;
use crate::engine::graphics::scene::HemisphereLight;
use crate::engine::xr::ReferenceSpaceType;

/// One mesh to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub name: String,
    pub model: Mat4,
    pub color: [f32; 3],
    /// Hemisphere light averaged over the mesh, already tinted by `color`.
    pub ambient: [f32; 3],
    pub index_count: u32,
    pub vertex_count: u32,
    /// Object-space bounding sphere radius.
    pub bounding_radius: f32,
}

/// Everything a surface needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    pub view_projection: Mat4,
    /// Passthrough sessions clear to transparent so the camera feed shows.
    pub clear_alpha: f32,
    /// Tracking space of the bound session; `None` when not presenting.
    pub reference_space: Option<ReferenceSpaceType>,
    pub light: Option<HemisphereLight>,
    pub items: Vec<DrawItem>,
}

/// Presentation target.
pub trait Surface {
    fn resize(&mut self, width: u32, height: u32);

    fn present(&mut self, frame: &DrawList) -> EngineResult<()>;

    /// Detach from the host container. No `present` follows.
    fn release(&mut self);
}

/// Counters shared between a `HeadlessSurface` and whoever created it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SurfaceStats {
    pub presents: u64,
    pub width: u32,
    pub height: u32,
    pub released: bool,
    pub last_frame: Option<DrawList>,
}

/// Surface that records what it was asked to draw.
#[derive(Debug)]
pub struct HeadlessSurface {
    stats: Rc<RefCell<SurfaceStats>>,
}

impl HeadlessSurface {
    pub fn new() -> (Self, Rc<RefCell<SurfaceStats>>) {
        let stats = Rc::new(RefCell::new(SurfaceStats::default()));
        (
            Self {
                stats: Rc::clone(&stats),
            },
            stats,
        )
    }
}

impl Surface for HeadlessSurface {
    fn resize(&mut self, width: u32, height: u32) {
        let mut stats = self.stats.borrow_mut();
        stats.width = width;
        stats.height = height;
    }

    fn present(&mut self, frame: &DrawList) -> EngineResult<()> {
        let mut stats = self.stats.borrow_mut();
        stats.presents += 1;
        stats.last_frame = Some(frame.clone());
        Ok(())
    }

    fn release(&mut self) {
        self.stats.borrow_mut().released = true;
    }
}

/// Surface bound to a winit window.
///
/// GPU submission is not wired here; presenting only paces the window.
pub struct WindowSurface {
    window: Arc<Window>,
    size: (u32, u32),
    presents: u64,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        Self {
            window,
            size: (size.width, size.height),
            presents: 0,
        }
    }
}

impl Surface for WindowSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn present(&mut self, frame: &DrawList) -> EngineResult<()> {
        if self.presents == 0 {
            log::debug!(
                "first present: {}x{}, {} item(s), light {:?}",
                self.size.0,
                self.size.1,
                frame.items.len(),
                frame.light
            );
        }
        log::trace!(
            "present #{}: clear alpha {}, space {:?}, view-projection {:?}",
            self.presents,
            frame.clear_alpha,
            frame.reference_space,
            frame.view_projection
        );
        for item in &frame.items {
            log::trace!(
                "  {} at {:?}: {} verts / {} indices, r={:.3}, color {:?}, ambient {:?}",
                item.name,
                item.model.w_axis.truncate(),
                item.vertex_count,
                item.index_count,
                item.bounding_radius,
                item.color,
                item.ambient
            );
        }
        self.window.pre_present_notify();
        self.presents += 1;
        Ok(())
    }

    fn release(&mut self) {
        log::debug!("window surface released after {} presents", self.presents);
    }
}
