use crate::engine::graphics::Renderer;
use crate::engine::xr::{
    GrantedSession, ReferenceSpaceType, SessionId, SessionInit, SessionMode, XrError,
    XrPlatform,
};

/// Owns the session request and the renderer's binding to it.
///
/// Contract:
/// - At most one session is active at a time.
/// - A granted session flips the renderer into immersive mode with the
///   configured reference space.
/// - The platform's end notification (not the end request) clears the session.
#[derive(Debug)]
pub struct SessionController {
    mode: SessionMode,
    init: SessionInit,
    reference_space: ReferenceSpaceType,
    active: Option<GrantedSession>,
}

impl SessionController {
    pub fn new(mode: SessionMode, init: SessionInit, reference_space: ReferenceSpaceType) -> Self {
        Self {
            mode,
            init,
            reference_space,
            active: None,
        }
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    pub async fn request<P: XrPlatform>(
        &mut self,
        platform: &mut P,
        renderer: &mut Renderer,
    ) -> Result<SessionId, XrError> {
        if self.active.is_some() {
            return Err(XrError::SessionActive);
        }

        let granted = platform.request_session(self.mode, &self.init).await?;
        log::info!(
            "session {} granted ({:?}, features: {:?})",
            granted.id,
            granted.mode,
            granted.enabled_features
        );

        renderer.xr.bind(granted.id, self.reference_space);
        let id = granted.id;
        self.active = Some(granted);
        Ok(id)
    }

    /// Ask the platform to end the active session. Returns the id that was asked to end.
    pub fn end<P: XrPlatform>(&self, platform: &mut P) -> Option<SessionId> {
        let id = self.active_id()?;
        platform.end_session(id);
        Some(id)
    }

    /// Platform confirmed `id` ended. Returns `false` for stale/unknown ids.
    pub fn on_session_ended(&mut self, id: SessionId, renderer: &mut Renderer) -> bool {
        if self.active_id() != Some(id) {
            return false;
        }
        self.active = None;
        renderer.xr.unbind();
        log::info!("session {id} ended");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::graphics::HeadlessSurface;
    use crate::engine::xr::{Feature, SimulatedPlatform};

    fn controller() -> SessionController {
        SessionController::new(
            SessionMode::ImmersiveAr,
            SessionInit::default().required(Feature::Local),
            ReferenceSpaceType::Local,
        )
    }

    fn renderer() -> Renderer {
        let (surface, _stats) = HeadlessSurface::new();
        Renderer::new(Box::new(surface), 640, 480)
    }

    #[test]
    fn request_binds_renderer() {
        let mut platform = SimulatedPlatform::new();
        let mut renderer = renderer();
        let mut session = controller();

        let id = pollster::block_on(session.request(&mut platform, &mut renderer)).unwrap();

        assert_eq!(session.active_id(), Some(id));
        assert!(renderer.xr.enabled);
        assert_eq!(renderer.xr.session(), Some(id));
        assert_eq!(renderer.xr.reference_space(), ReferenceSpaceType::Local);
    }

    #[test]
    fn failed_request_leaves_renderer_untouched() {
        let mut platform = SimulatedPlatform::new().rejecting_sessions();
        let mut renderer = renderer();
        let mut session = controller();

        assert!(pollster::block_on(session.request(&mut platform, &mut renderer)).is_err());
        assert!(session.active_id().is_none());
        assert!(!renderer.xr.enabled);
    }

    #[test]
    fn end_notification_for_other_session_is_ignored() {
        let mut platform = SimulatedPlatform::new();
        let mut renderer = renderer();
        let mut session = controller();
        let id = pollster::block_on(session.request(&mut platform, &mut renderer)).unwrap();

        assert!(!session.on_session_ended(SessionId::new(), &mut renderer));
        assert_eq!(session.active_id(), Some(id));

        assert_eq!(session.end(&mut platform), Some(id));
        assert!(session.on_session_ended(id, &mut renderer));
        assert!(session.active_id().is_none());
        assert!(renderer.xr.session().is_none());
    }

    #[test]
    fn request_while_active_is_rejected_locally() {
        let mut platform = SimulatedPlatform::new();
        let mut renderer = renderer();
        let mut session = controller();
        pollster::block_on(session.request(&mut platform, &mut renderer)).unwrap();

        let err = pollster::block_on(session.request(&mut platform, &mut renderer)).unwrap_err();
        assert_eq!(err, XrError::SessionActive);
        assert_eq!(platform.session_requests, 1);
    }
}
