//! Command-line interface for ar-place.

use std::path::PathBuf;

use clap::Parser;

use crate::engine::EngineResult;
use crate::engine::config::{AppConfig, Variant};
use crate::engine::xr::{Feature, SimulatedPlatform};

#[derive(Debug, Clone, Parser)]
#[command(name = "ar-place", version, about = "Place a spinning object in an AR session")]
pub struct Cli {
    /// JSON config file; missing keys use the variant's defaults.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preset to start from. Overrides the config file's `variant`.
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Run the scripted demo without opening a window.
    #[arg(long)]
    pub headless: bool,

    /// Frames to run per phase of the headless demo.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Make the simulated platform report AR as unsupported.
    #[arg(long)]
    pub unsupported: bool,

    /// Simulate a platform without a capability query.
    #[arg(long)]
    pub no_capability_query: bool,

    /// Make the capability query fail with this message.
    #[arg(long, value_name = "MESSAGE")]
    pub query_error: Option<String>,

    /// Reject every session request.
    #[arg(long)]
    pub reject_sessions: bool,

    /// Features the simulated platform can grant (comma separated).
    #[arg(long, value_enum, value_delimiter = ',')]
    pub features: Option<Vec<Feature>>,
}

impl Cli {
    /// Resolve the effective configuration from `--config` and `--variant`.
    pub fn app_config(&self) -> EngineResult<AppConfig> {
        match &self.config {
            Some(path) => {
                log::info!("loading config from {}", path.display());
                AppConfig::load(path, self.variant)
            }
            None => Ok(AppConfig::for_variant(self.variant.unwrap_or_default())),
        }
    }

    /// Simulated platform shaped by the fault options and the config's
    /// floor and pointer geometry.
    pub fn platform(&self, config: &AppConfig) -> SimulatedPlatform {
        let mut platform = SimulatedPlatform::new()
            .with_ar_supported(!self.unsupported)
            .with_floor_height(config.floor_height)
            .with_pointer_depth(config.pointer_depth);
        if self.no_capability_query {
            platform = platform.without_capability_query();
        }
        if let Some(message) = &self.query_error {
            platform = platform.with_query_error(message.clone());
        }
        if self.reject_sessions {
            platform = platform.rejecting_sessions();
        }
        if let Some(features) = &self.features {
            platform = platform.with_features(features.iter().copied());
        }
        platform
    }
}
