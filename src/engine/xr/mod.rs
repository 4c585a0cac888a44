//! Immersive-session platform seam.
//!
//! Everything the AR context needs from the host platform goes through
//! [`XrPlatform`]: the capability query, session request/end, a queue of
//! platform events (select, session end, animation frames) and hit tests.
//! The desktop simulation in `simulated` is the backend the hosts use.

pub mod probe;
pub mod session;
pub mod simulated;

pub use probe::{ProbeOutcome, probe_capability};
pub use session::SessionController;
pub use simulated::SimulatedPlatform;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    Inline,
    ImmersiveVr,
    ImmersiveAr,
}

/// Optional platform capabilities a session can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Viewer,
    Local,
    LocalFloor,
    HitTest,
    DomOverlay,
    LightEstimation,
    PlaneDetection,
    Anchors,
}

/// Tracking space the renderer reports poses in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceType {
    Viewer,
    #[default]
    Local,
    LocalFloor,
}

/// Required/optional feature flags passed along with a session request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionInit {
    pub required_features: Vec<Feature>,
    pub optional_features: Vec<Feature>,
}

impl SessionInit {
    pub fn required(mut self, feature: Feature) -> Self {
        self.required_features.push(feature);
        self
    }

    pub fn optional(mut self, feature: Feature) -> Self {
        self.optional_features.push(feature);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position + orientation sample in the session's reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Direction the pose looks along (-Z in its local frame).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// The pose with a unit orientation, or `None` when a component is not
    /// finite or the orientation is degenerate. Runtimes hand out quaternions
    /// that drift slightly off unit length.
    pub fn normalized(self) -> Option<Pose> {
        if !self.position.is_finite() || !self.orientation.is_finite() {
            return None;
        }
        let length = self.orientation.length();
        if length < 1e-6 {
            return None;
        }
        Some(Self::new(self.position, self.orientation / length))
    }
}

/// Input source handle delivered with a select.
///
/// `target_ray` is the controller's world transform at the moment of the
/// select; `None` when the platform could not track it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSource {
    pub target_ray: Option<Pose>,
}

impl InputSource {
    /// Screen tap/click: the ray starts at the pointer.
    pub fn screen(target_ray: Option<Pose>) -> Self {
        Self { target_ray }
    }
}

/// What the platform granted for a session request.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantedSession {
    pub id: SessionId,
    pub mode: SessionMode,
    pub enabled_features: Vec<Feature>,
}

impl GrantedSession {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.enabled_features.contains(&feature)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Select(InputSource),
    SessionEnded(SessionId),
    AnimationFrame { time_ms: f64, viewer: Option<Pose> },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XrError {
    #[error("{0:?} sessions are not supported")]
    Unsupported(SessionMode),

    #[error("required feature {0:?} is not available")]
    FeatureUnavailable(Feature),

    #[error("a session is already active")]
    SessionActive,

    #[error("capability query failed: {0}")]
    Query(String),

    #[error("xr backend: {0}")]
    Backend(String),
}

/// Host immersive-session API.
///
/// Single-threaded: the async calls are driven to completion on the UI thread
/// (see `pollster::block_on` in the hosts), so implementations need not be
/// `Send`.
#[allow(async_fn_in_trait)]
pub trait XrPlatform {
    /// Whether the platform exposes a capability query at all.
    fn has_capability_query(&self) -> bool;

    async fn is_session_supported(&mut self, mode: SessionMode) -> Result<bool, XrError>;

    async fn request_session(
        &mut self,
        mode: SessionMode,
        init: &SessionInit,
    ) -> Result<GrantedSession, XrError>;

    /// Ask the platform to end `id`. The end is confirmed later through
    /// [`PlatformEvent::SessionEnded`].
    fn end_session(&mut self, id: SessionId);

    fn poll_event(&mut self) -> Option<PlatformEvent>;

    /// Nearest real-world surface hit along the source's target ray, if any.
    fn hit_test(&mut self, source: &InputSource) -> Option<Pose>;
}

/// Host-side hooks the desktop runner uses to feed window input into a backend.
pub trait HostBridge {
    /// A primary click/tap at a screen position.
    fn screen_select(&mut self, ray_origin: Vec3, ray_direction: Vec3);

    /// One presentation frame elapsed.
    fn frame(&mut self, time_ms: f64);
}
