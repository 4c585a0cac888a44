pub mod animation_loop;
pub mod camera;
pub mod cli;
pub mod config;
pub mod context;
pub mod graphics;
pub mod headless;
pub mod overlay;
pub mod placement;
pub mod state;
pub mod subscription;
pub mod user_input;
pub mod windowing;
pub mod xr;

#[cfg(test)]
mod context_tests;

pub use context::{ArContext, Lifecycle};
pub use windowing::Windowing;

use crate::engine::xr::XrError;

/// Engine-level error type.
///
/// Platform failures normally degrade into a UI state inside `ArContext`; the
/// variants here are what still reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("context is not mounted")]
    NotMounted,

    #[error("context has been disposed")]
    Disposed,

    #[error("drawing surface has been released")]
    SurfaceReleased,

    #[error("platform error: {0}")]
    Platform(#[from] XrError),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("windowing: {0}")]
    Windowing(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
