use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::engine::config::AppConfig;
use crate::engine::graphics::WindowSurface;
use crate::engine::user_input::{HostAction, UserInput};
use crate::engine::xr::{HostBridge, XrPlatform};
use crate::engine::{ArContext, EngineError, EngineResult, Lifecycle};

const WINDOW_TITLE: &str = "ar-place";

/// winit host for the AR view (winit 0.30 `ApplicationHandler` style).
pub struct Windowing;

impl Windowing {
    pub fn run_app<P>(config: AppConfig, platform: P) -> EngineResult<()>
    where
        P: XrPlatform + HostBridge,
    {
        let event_loop = EventLoop::new().map_err(|e| EngineError::Windowing(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            config: Some(config),
            platform,
            window: None,
            context: None,
            input: UserInput::new(),
            started: Instant::now(),
            error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| EngineError::Windowing(e.to_string()))?;

        match app.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// The context if it can still take events. After unmount, late window
/// events are dropped instead of failing with `Disposed`.
fn live(context: &mut Option<ArContext>) -> Option<&mut ArContext> {
    context.as_mut().filter(|ctx| ctx.lifecycle() != Lifecycle::Disposed)
}

struct App<P> {
    config: Option<AppConfig>,
    platform: P,
    window: Option<Arc<Window>>,
    context: Option<ArContext>,
    input: UserInput,
    started: Instant,
    /// First fatal error; reported after the loop exits.
    error: Option<EngineError>,
}

impl<P: XrPlatform + HostBridge> App<P> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        log::error!("{err}");
        if let Some(ctx) = self.context.as_mut() {
            ctx.unmount(&mut self.platform);
        }
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn refresh_title(&self) {
        let (Some(window), Some(ctx)) = (&self.window, &self.context) else {
            return;
        };
        let title = match ctx.overlay_view().text() {
            Some(text) => format!("{WINDOW_TITLE} - {text}"),
            None => WINDOW_TITLE.to_string(),
        };
        window.set_title(&title);
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: HostAction) -> EngineResult<()> {
        let Some(ctx) = live(&mut self.context) else {
            return Ok(());
        };

        match action {
            HostAction::StartSession => {
                pollster::block_on(ctx.start_session(&mut self.platform))?;
            }
            HostAction::Back => {
                if ctx.state().is_active() {
                    ctx.end_session(&mut self.platform)?;
                } else {
                    ctx.unmount(&mut self.platform);
                    event_loop.exit();
                }
            }
            HostAction::Select { x, y } => {
                let (width, height) = ctx.renderer().size();
                let viewport = Vec2::new(width as f32, height as f32);
                if let Some((origin, dir)) = ctx.camera().screen_ray(Vec2::new(x, y), viewport) {
                    self.platform.screen_select(origin, dir);
                }
            }
        }
        Ok(())
    }
}

impl<P: XrPlatform + HostBridge> ApplicationHandler for App<P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(config) = self.config.take() else {
            return;
        };

        let attrs: WindowAttributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width as f64, config.height as f64));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, EngineError::Windowing(e.to_string()));
                return;
            }
        };

        let surface = WindowSurface::new(Arc::clone(&window));
        let size = window.inner_size();
        let mut ctx = ArContext::new(config, Box::new(surface));

        if let Err(err) = pollster::block_on(ctx.mount(&mut self.platform)) {
            self.fail(event_loop, err);
            return;
        }
        if let Err(err) = ctx.resize(size.width, size.height) {
            self.fail(event_loop, err);
            return;
        }

        self.context = Some(ctx);
        self.window = Some(window);
        self.refresh_title();

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(action) = self.input.handle_window_event(&event) {
            if let Err(err) = self.handle_action(event_loop, action) {
                self.fail(event_loop, err);
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.unmount(&mut self.platform);
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(ctx) = live(&mut self.context) {
                    if let Err(err) = ctx.resize(size.width, size.height) {
                        self.fail(event_loop, err);
                        return;
                    }
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(ctx) = live(&mut self.context) else {
                    return;
                };

                self.platform
                    .frame(self.started.elapsed().as_secs_f64() * 1000.0);
                if let Err(err) = ctx.pump(&mut self.platform) {
                    self.fail(event_loop, err);
                    return;
                }

                self.refresh_title();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            _ => {}
        }
    }
}
