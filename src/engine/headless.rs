//! Scripted run without a window.
//!
//! Drives an `ArContext` over a `HeadlessSurface` through one full session:
//! mount, start, some frames, a tap, more frames, end, unmount.

use glam::Vec2;

use crate::engine::config::AppConfig;
use crate::engine::graphics::HeadlessSurface;
use crate::engine::overlay::OverlayView;
use crate::engine::xr::{HostBridge, XrPlatform};
use crate::engine::{ArContext, EngineResult};

/// Frame interval used for the synthetic clock.
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Where the demo taps, as a fraction of the viewport. Slightly below centre
/// so that hit tests against a floor find something.
const TAP_AT: Vec2 = Vec2::new(0.5, 0.75);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoReport {
    /// Overlay views in the order they were shown, without repeats.
    pub overlay_views: Vec<OverlayView>,
    pub placed: bool,
    pub frames_presented: u64,
    /// Object count in the last frame drawn.
    pub last_frame_items: usize,
    pub surface_size: (u32, u32),
    pub surface_released: bool,
    pub ended_cleanly: bool,
}

impl DemoReport {
    fn record(&mut self, view: OverlayView) {
        if self.overlay_views.last() != Some(&view) {
            log::info!("overlay: {view:?}");
            self.overlay_views.push(view);
        }
    }
}

pub struct HeadlessDemo {
    frames_per_phase: u32,
    clock_ms: f64,
}

impl HeadlessDemo {
    pub fn new(frames_per_phase: u32) -> Self {
        Self {
            frames_per_phase,
            clock_ms: 0.0,
        }
    }

    pub fn run<P>(&mut self, config: AppConfig, platform: &mut P) -> EngineResult<DemoReport>
    where
        P: XrPlatform + HostBridge,
    {
        let (surface, stats) = HeadlessSurface::new();
        let mut ctx = ArContext::new(config, Box::new(surface));
        let mut report = DemoReport::default();

        let result = self.script(&mut ctx, platform, &mut report);
        ctx.unmount(platform);
        result?;

        {
            let stats = stats.borrow();
            report.frames_presented = stats.presents;
            report.last_frame_items = stats.last_frame.as_ref().map_or(0, |frame| frame.items.len());
            report.surface_size = (stats.width, stats.height);
            report.surface_released = stats.released;
        }
        log::info!(
            "headless demo finished: placed={} frames={} items={} released={}",
            report.placed,
            report.frames_presented,
            report.last_frame_items,
            report.surface_released
        );
        Ok(report)
    }

    fn script<P>(&mut self, ctx: &mut ArContext, platform: &mut P, report: &mut DemoReport) -> EngineResult<()>
    where
        P: XrPlatform + HostBridge,
    {
        pollster::block_on(ctx.mount(platform))?;
        report.record(ctx.overlay_view());

        if !ctx.state().can_start() {
            log::warn!("AR is not available; skipping the session");
            return Ok(());
        }

        pollster::block_on(ctx.start_session(platform))?;
        report.record(ctx.overlay_view());
        if !ctx.state().is_active() {
            return Ok(());
        }

        self.frames(ctx, platform, report)?;

        let (width, height) = ctx.renderer().size();
        let viewport = Vec2::new(width as f32, height as f32);
        if let Some((origin, dir)) = ctx.camera().screen_ray(viewport * TAP_AT, viewport) {
            platform.screen_select(origin, dir);
        }
        ctx.pump(platform)?;
        report.placed = ctx.state().is_placed();
        report.record(ctx.overlay_view());

        self.frames(ctx, platform, report)?;

        ctx.end_session(platform)?;
        ctx.pump(platform)?;
        report.ended_cleanly = !ctx.state().is_active();
        report.record(ctx.overlay_view());
        Ok(())
    }

    fn frames<P>(&mut self, ctx: &mut ArContext, platform: &mut P, report: &mut DemoReport) -> EngineResult<()>
    where
        P: XrPlatform + HostBridge,
    {
        for _ in 0..self.frames_per_phase {
            platform.frame(self.clock_ms);
            self.clock_ms += FRAME_MS;
            ctx.pump(platform)?;
            report.record(ctx.overlay_view());
        }
        Ok(())
    }
}
