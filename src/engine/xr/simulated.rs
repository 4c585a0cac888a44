//! Desktop emulation of an immersive-AR platform.
//!
//! The viewer sits at the origin of a `local` space looking down -Z with a
//! virtual floor below it. Screen clicks become select events whose target ray
//! starts a short distance along the camera ray; hit tests intersect that ray
//! with the floor plane. Used by the window host, the headless demo and tests.

use std::collections::{HashSet, VecDeque};

use glam::{Quat, Vec3};

use crate::engine::xr::{
    Feature, GrantedSession, HostBridge, InputSource, PlatformEvent, Pose, SessionId, SessionInit,
    SessionMode, XrError, XrPlatform,
};

const DEFAULT_FLOOR_HEIGHT: f32 = -1.2;
const DEFAULT_POINTER_DEPTH: f32 = 0.3;

#[derive(Debug)]
pub struct SimulatedPlatform {
    capability_query: bool,
    ar_supported: bool,
    query_error: Option<String>,
    reject_sessions: bool,
    supported_features: HashSet<Feature>,

    active: Option<GrantedSession>,
    events: VecDeque<PlatformEvent>,

    floor_height: f32,
    pointer_depth: f32,

    /// Number of capability queries answered (or rejected).
    pub capability_queries: usize,
    /// Number of `end_session` calls received.
    pub end_requests: usize,
    /// Number of session requests received (granted or not).
    pub session_requests: usize,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self {
            capability_query: true,
            ar_supported: true,
            query_error: None,
            reject_sessions: false,
            supported_features: [
                Feature::Viewer,
                Feature::Local,
                Feature::LocalFloor,
                Feature::HitTest,
                Feature::DomOverlay,
            ]
            .into_iter()
            .collect(),
            active: None,
            events: VecDeque::new(),
            floor_height: DEFAULT_FLOOR_HEIGHT,
            pointer_depth: DEFAULT_POINTER_DEPTH,
            capability_queries: 0,
            end_requests: 0,
            session_requests: 0,
        }
    }

    pub fn without_capability_query(mut self) -> Self {
        self.capability_query = false;
        self
    }

    pub fn with_ar_supported(mut self, supported: bool) -> Self {
        self.ar_supported = supported;
        self
    }

    pub fn with_query_error(mut self, message: impl Into<String>) -> Self {
        self.query_error = Some(message.into());
        self
    }

    pub fn rejecting_sessions(mut self) -> Self {
        self.reject_sessions = true;
        self
    }

    /// Replace the set of features the platform can grant.
    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.supported_features = features.into_iter().collect();
        self
    }

    pub fn with_floor_height(mut self, floor_height: f32) -> Self {
        self.floor_height = floor_height;
        self
    }

    pub fn with_pointer_depth(mut self, pointer_depth: f32) -> Self {
        self.pointer_depth = pointer_depth;
        self
    }

    #[cfg(test)]
    pub fn set_reject_sessions(&mut self, reject: bool) {
        self.reject_sessions = reject;
    }

    #[cfg(test)]
    pub fn active_session(&self) -> Option<&GrantedSession> {
        self.active.as_ref()
    }

    /// Queue a select from an arbitrary input source.
    pub fn push_select(&mut self, source: InputSource) {
        self.events.push_back(PlatformEvent::Select(source));
    }

    pub fn push_frame(&mut self, time_ms: f64) {
        self.events.push_back(PlatformEvent::AnimationFrame {
            time_ms,
            viewer: Some(Pose::IDENTITY),
        });
    }

    /// The platform ends the session on its own (e.g. the user left AR).
    #[cfg(test)]
    pub fn simulate_session_end(&mut self) {
        if let Some(session) = self.active.take() {
            self.events.push_back(PlatformEvent::SessionEnded(session.id));
        }
    }

    /// Target-ray pose for a ray, placed `pointer_depth` metres along it.
    pub fn pointer_pose(&self, origin: Vec3, direction: Vec3) -> Option<Pose> {
        let dir = direction.try_normalize()?;
        let orientation = Quat::from_rotation_arc(Vec3::NEG_Z, dir);
        Some(Pose::new(origin + dir * self.pointer_depth, orientation))
    }
}

impl XrPlatform for SimulatedPlatform {
    fn has_capability_query(&self) -> bool {
        self.capability_query
    }

    async fn is_session_supported(&mut self, mode: SessionMode) -> Result<bool, XrError> {
        self.capability_queries += 1;
        if let Some(message) = &self.query_error {
            return Err(XrError::Query(message.clone()));
        }
        Ok(match mode {
            SessionMode::ImmersiveAr => self.ar_supported,
            SessionMode::ImmersiveVr => false,
            SessionMode::Inline => true,
        })
    }

    async fn request_session(
        &mut self,
        mode: SessionMode,
        init: &SessionInit,
    ) -> Result<GrantedSession, XrError> {
        self.session_requests += 1;

        if self.active.is_some() {
            return Err(XrError::SessionActive);
        }
        if self.reject_sessions {
            return Err(XrError::Backend("session request was rejected".into()));
        }
        if mode == SessionMode::ImmersiveAr && !self.ar_supported {
            return Err(XrError::Unsupported(mode));
        }
        if let Some(missing) = init
            .required_features
            .iter()
            .find(|f| !self.supported_features.contains(f))
        {
            return Err(XrError::FeatureUnavailable(*missing));
        }

        let mut enabled_features = init.required_features.clone();
        for feature in &init.optional_features {
            if self.supported_features.contains(feature) && !enabled_features.contains(feature) {
                enabled_features.push(*feature);
            }
        }

        let session = GrantedSession {
            id: SessionId::new(),
            mode,
            enabled_features,
        };
        self.active = Some(session.clone());
        Ok(session)
    }

    fn end_session(&mut self, id: SessionId) {
        self.end_requests += 1;
        if self.active.as_ref().is_some_and(|s| s.id == id) {
            self.active = None;
            self.events.push_back(PlatformEvent::SessionEnded(id));
        }
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.events.pop_front()
    }

    fn hit_test(&mut self, source: &InputSource) -> Option<Pose> {
        let session = self.active.as_ref()?;
        if !session.has_feature(Feature::HitTest) {
            return None;
        }

        let ray = source.target_ray?;
        let dir = ray.forward();
        // Floor is horizontal; rays that do not point down never reach it.
        if dir.y >= -1e-4 {
            return None;
        }
        let t = (self.floor_height - ray.position.y) / dir.y;
        if t < 0.0 {
            return None;
        }
        Some(Pose::from_position(ray.position + dir * t))
    }
}

impl HostBridge for SimulatedPlatform {
    fn screen_select(&mut self, ray_origin: Vec3, ray_direction: Vec3) {
        let pose = self.pointer_pose(ray_origin, ray_direction);
        self.push_select(InputSource::screen(pose));
    }

    fn frame(&mut self, time_ms: f64) {
        self.push_frame(time_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ar_init() -> SessionInit {
        SessionInit::default()
            .required(Feature::Local)
            .optional(Feature::DomOverlay)
            .optional(Feature::LightEstimation)
    }

    #[test]
    fn grants_required_and_available_optional_features() {
        let mut platform = SimulatedPlatform::new();
        let session =
            pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &ar_init()))
                .unwrap();

        assert!(session.has_feature(Feature::Local));
        assert!(session.has_feature(Feature::DomOverlay));
        assert!(!session.has_feature(Feature::LightEstimation));
    }

    #[test]
    fn missing_required_feature_rejects() {
        let mut platform = SimulatedPlatform::new().with_features([Feature::Local]);
        let init = SessionInit::default().required(Feature::HitTest);
        let err = pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &init))
            .unwrap_err();
        assert_eq!(err, XrError::FeatureUnavailable(Feature::HitTest));
        assert!(platform.active_session().is_none());
    }

    #[test]
    fn second_request_while_active_fails() {
        let mut platform = SimulatedPlatform::new();
        pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &ar_init())).unwrap();
        let err = pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &ar_init()))
            .unwrap_err();
        assert_eq!(err, XrError::SessionActive);
    }

    #[test]
    fn end_session_emits_event_once() {
        let mut platform = SimulatedPlatform::new();
        let session =
            pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &ar_init()))
                .unwrap();

        platform.end_session(session.id);
        platform.end_session(session.id);

        assert_eq!(platform.poll_event(), Some(PlatformEvent::SessionEnded(session.id)));
        assert_eq!(platform.poll_event(), None);
        assert_eq!(platform.end_requests, 2);
    }

    #[test]
    fn hit_test_lands_on_floor() {
        let mut platform = SimulatedPlatform::new().with_floor_height(-1.0);
        let init = SessionInit::default().required(Feature::HitTest);
        pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &init)).unwrap();

        let pose = platform.pointer_pose(Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0));
        let hit = platform.hit_test(&InputSource::screen(pose)).unwrap();

        assert!((hit.position.y + 1.0).abs() < 1e-4);
        assert!(hit.position.z < 0.0);
    }

    #[test]
    fn hit_test_misses_when_looking_up_or_without_feature() {
        let mut platform = SimulatedPlatform::new();
        let up = platform.pointer_pose(Vec3::ZERO, Vec3::Y);
        // No session yet.
        assert!(platform.hit_test(&InputSource::screen(up)).is_none());

        let init = SessionInit::default().required(Feature::Local);
        pollster::block_on(platform.request_session(SessionMode::ImmersiveAr, &init)).unwrap();
        let down = platform.pointer_pose(Vec3::ZERO, Vec3::NEG_Y);
        // Session without hit-test.
        assert!(platform.hit_test(&InputSource::screen(down)).is_none());
    }

    #[test]
    fn screen_select_places_pointer_along_ray() {
        let mut platform = SimulatedPlatform::new().with_pointer_depth(0.5);
        platform.screen_select(Vec3::ZERO, Vec3::NEG_Z * 3.0);

        let Some(PlatformEvent::Select(source)) = platform.poll_event() else {
            panic!("expected a select event");
        };
        let pose = source.target_ray.unwrap();
        assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.5), 1e-5));
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }
}
