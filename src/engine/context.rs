//! The owning AR context.
//!
//! `ArContext` holds everything the AR view needs (scene, camera, renderer,
//! session controller, state machine, subscriptions) and walks it through an
//! explicit lifecycle: `Created -> Mounted -> Disposed`.
//!
//! Teardown order matters: the frame subscription goes first, then the
//! session is ended, and only then is the drawing surface released. After
//! that nothing dispatches into the scene again.

use glam::Vec3;

use crate::engine::animation_loop::AnimationLoop;
use crate::engine::camera::PerspectiveCamera;
use crate::engine::config::AppConfig;
use crate::engine::graphics::{HemisphereLight, Node, Renderer, Scene, Surface};
use crate::engine::overlay::{Overlay, OverlayView};
use crate::engine::placement::PlacementHandler;
use crate::engine::state::{ArEvent, ArState};
use crate::engine::subscription::{Subscription, Subscriptions, Topic};
use crate::engine::xr::{
    InputSource, PlatformEvent, Pose, ProbeOutcome, SessionController, SessionId, SessionMode,
    XrPlatform, probe_capability,
};
use crate::engine::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Mounted,
    Disposed,
}

pub struct ArContext {
    lifecycle: Lifecycle,
    state: ArState,

    scene: Scene,
    camera: PerspectiveCamera,
    renderer: Renderer,

    session: SessionController,
    placement: PlacementHandler,
    animation: AnimationLoop,
    overlay: Overlay,

    subscriptions: Subscriptions,
    frame_subscription: Option<Subscription>,
    session_subscriptions: Vec<Subscription>,
}

impl ArContext {
    /// Scene bootstrap: camera, hemisphere-lit scene, renderer on `surface`.
    pub fn new(config: AppConfig, surface: Box<dyn Surface>) -> Self {
        let (width, height) = (config.width.max(1), config.height.max(1));
        config.warn_unused();

        let camera = PerspectiveCamera::new(config.camera, width as f32 / height as f32);

        let mut scene = Scene::new();
        scene.add(
            Node::hemisphere_light(
                "hemisphere-light",
                HemisphereLight {
                    sky_color: [1.0, 1.0, 1.0],
                    ground_color: [0.73, 0.73, 1.0],
                    intensity: 3.0,
                },
            )
            .with_position(Vec3::new(0.5, 1.0, 0.25)),
        );

        let renderer = Renderer::new(surface, width, height);

        let session = SessionController::new(
            SessionMode::ImmersiveAr,
            config.effective_session_init(),
            config.reference_space,
        );
        let placement = PlacementHandler::new(
            config.placement,
            config.object,
            config.object_size,
            config.color,
        );

        Self {
            lifecycle: Lifecycle::Created,
            state: ArState::Probing,
            scene,
            camera,
            renderer,
            session,
            placement,
            animation: AnimationLoop::new(config.spin_step),
            overlay: Overlay::new(config.show_hint),
            subscriptions: Subscriptions::new(),
            frame_subscription: None,
            session_subscriptions: Vec::new(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> &ArState {
        &self.state
    }

    pub fn overlay_view(&self) -> OverlayView {
        self.overlay.view(&self.state)
    }

    #[cfg(test)]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[cfg(test)]
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    fn ensure_not_disposed(&self) -> EngineResult<()> {
        match self.lifecycle {
            Lifecycle::Disposed => Err(EngineError::Disposed),
            _ => Ok(()),
        }
    }

    /// Register the frame loop and run the one-shot capability probe.
    pub async fn mount<P: XrPlatform>(&mut self, platform: &mut P) -> EngineResult<()> {
        self.ensure_not_disposed()?;
        if self.lifecycle == Lifecycle::Mounted {
            return Ok(());
        }

        self.lifecycle = Lifecycle::Mounted;
        self.frame_subscription = Some(self.subscriptions.subscribe(Topic::AnimationFrame));

        let outcome = probe_capability(platform, SessionMode::ImmersiveAr).await;
        match &outcome {
            ProbeOutcome::Supported => log::info!("immersive-ar is supported"),
            ProbeOutcome::Unsupported => log::info!("immersive-ar is not supported"),
            ProbeOutcome::QueryUnavailable => log::info!("no immersive capability query; AR unavailable"),
            ProbeOutcome::QueryFailed(err) => log::warn!("immersive-ar capability query failed: {err}"),
        }
        self.state.apply(ArEvent::ProbeResolved {
            supported: outcome.is_supported(),
        });
        Ok(())
    }

    /// Request a session. Failures are logged and leave the state inactive;
    /// the caller may simply try again.
    pub async fn start_session<P: XrPlatform>(&mut self, platform: &mut P) -> EngineResult<()> {
        self.ensure_not_disposed()?;
        if self.lifecycle != Lifecycle::Mounted {
            return Err(EngineError::NotMounted);
        }
        if !self.state.can_start() {
            log::debug!("start ignored in state {:?}", self.state);
            return Ok(());
        }

        match self.session.request(platform, &mut self.renderer).await {
            Ok(id) => {
                self.state.apply(ArEvent::SessionStarted(id));
                self.session_subscriptions = vec![
                    self.subscriptions.subscribe(Topic::Select),
                    self.subscriptions.subscribe(Topic::SessionEnd),
                ];
            }
            Err(err) => {
                log::error!("failed to start AR session: {err}");
                self.state.apply(ArEvent::SessionFailed);
            }
        }
        Ok(())
    }

    /// Ask the platform to end the active session. State resets when the
    /// platform confirms through `pump`.
    pub fn end_session<P: XrPlatform>(&mut self, platform: &mut P) -> EngineResult<()> {
        self.ensure_not_disposed()?;
        if self.session.end(platform).is_none() {
            log::debug!("end ignored: no active session");
        }
        Ok(())
    }

    /// Drain platform events and dispatch those with a live subscription.
    /// Returns how many were dispatched.
    pub fn pump<P: XrPlatform>(&mut self, platform: &mut P) -> EngineResult<usize> {
        self.ensure_not_disposed()?;

        let mut dispatched = 0;
        while let Some(event) = platform.poll_event() {
            if !self.subscriptions.is_subscribed(Topic::of(&event)) {
                log::trace!("dropping {event:?}: no subscriber");
                continue;
            }
            self.dispatch(platform, event)?;
            dispatched += 1;
        }
        Ok(dispatched)
    }

    fn dispatch<P: XrPlatform>(&mut self, platform: &mut P, event: PlatformEvent) -> EngineResult<()> {
        match event {
            PlatformEvent::Select(source) => {
                self.on_select(platform, &source);
                Ok(())
            }
            PlatformEvent::SessionEnded(id) => {
                self.on_session_ended(id);
                Ok(())
            }
            PlatformEvent::AnimationFrame { viewer, .. } => self.on_frame(viewer),
        }
    }

    fn on_select<P: XrPlatform>(&mut self, platform: &mut P, source: &InputSource) {
        if let Some(node) = self
            .placement
            .place(&self.state, platform, source, &mut self.scene)
        {
            self.state.apply(ArEvent::Placed(node));
        }
    }

    fn on_session_ended(&mut self, id: SessionId) {
        if !self.session.on_session_ended(id, &mut self.renderer) {
            log::debug!("ignoring end of unknown session {id}");
            return;
        }

        // Next session starts from an empty placement.
        if let Some(node) = self.state.placed_node() {
            self.scene.remove(node);
        }
        self.state.apply(ArEvent::SessionEnded(id));
        self.session_subscriptions.clear();
    }

    fn on_frame(&mut self, viewer: Option<Pose>) -> EngineResult<()> {
        self.animation.tick(
            &self.state,
            viewer,
            &mut self.scene,
            &mut self.camera,
            &mut self.renderer,
        )
    }

    /// Viewport changed: camera aspect and drawing size follow, nothing else.
    pub fn resize(&mut self, width: u32, height: u32) -> EngineResult<()> {
        self.ensure_not_disposed()?;
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.camera.set_viewport(width, height);
        self.renderer.set_size(width, height);
        Ok(())
    }

    /// Detach the frame loop, end any session, release the surface.
    pub fn unmount<P: XrPlatform>(&mut self, platform: &mut P) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }

        self.frame_subscription = None;

        if let Some(id) = self.session.end(platform) {
            self.on_session_ended(id);
        }
        self.session_subscriptions.clear();

        self.renderer.dispose();
        self.lifecycle = Lifecycle::Disposed;
        log::info!("AR view unmounted");
    }
}
