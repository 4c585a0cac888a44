//! Application configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. The three presets mirror the variants the app ships with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::camera::CameraSettings;
use crate::engine::graphics::ObjectShape;
use crate::engine::placement::PlacementMode;
use crate::engine::xr::{Feature, ReferenceSpaceType, SessionInit};
use crate::engine::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Cube placed at the controller transform.
    #[default]
    Cube,
    /// Cube placed at a hit-test pose.
    HitTest,
    /// Tetrahedron at the controller transform, no placement hint.
    Tetra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub variant: Variant,
    pub object: ObjectShape,
    /// Linear RGB.
    pub color: [f32; 3],
    /// Edge length / diameter in metres.
    pub object_size: f32,
    pub placement: PlacementMode,
    /// Radians added to rotation x and y per frame once placed.
    pub spin_step: f32,
    pub show_hint: bool,
    pub session_init: SessionInit,
    pub reference_space: ReferenceSpaceType,
    pub camera: CameraSettings,
    /// Initial drawing size before the host reports one.
    pub width: u32,
    pub height: u32,
    /// Simulated platform: floor plane height in the local space.
    pub floor_height: f32,
    /// Simulated platform: how far along the screen ray the pointer sits.
    pub pointer_depth: f32,
    /// Accepted for compatibility; nothing loads models.
    pub model_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Cube)
    }
}

impl AppConfig {
    pub fn for_variant(variant: Variant) -> Self {
        let base = Self {
            variant,
            object: ObjectShape::Cube,
            color: [0.27, 0.53, 1.0],
            object_size: 0.1,
            placement: PlacementMode::ControllerTransform,
            spin_step: 0.01,
            show_hint: true,
            session_init: SessionInit::default()
                .required(Feature::Local)
                .optional(Feature::DomOverlay),
            reference_space: ReferenceSpaceType::Local,
            camera: CameraSettings::default(),
            width: 1024,
            height: 768,
            floor_height: -1.2,
            pointer_depth: 0.3,
            model_path: None,
        };

        match variant {
            Variant::Cube => base,
            Variant::HitTest => Self {
                placement: PlacementMode::HitTest,
                session_init: SessionInit::default()
                    .required(Feature::Local)
                    .required(Feature::HitTest)
                    .optional(Feature::DomOverlay),
                ..base
            },
            Variant::Tetra => Self {
                object: ObjectShape::Tetrahedron,
                color: [1.0, 0.55, 0.1],
                object_size: 0.15,
                show_hint: false,
                ..base
            },
        }
    }

    /// Read a JSON config. Missing keys fall back to the preset of `variant`
    /// (from the command line), else the variant named in the file, else `Cube`.
    pub fn load(path: &Path, variant: Option<Variant>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, variant)
    }

    pub fn from_json(text: &str, variant: Option<Variant>) -> EngineResult<Self> {
        let overrides: serde_json::Value = serde_json::from_str(text)?;
        let Some(fields) = overrides.as_object() else {
            // Let serde produce the type error.
            return Ok(serde_json::from_value(overrides)?);
        };

        let file_variant = fields
            .get("variant")
            .cloned()
            .map(serde_json::from_value::<Variant>)
            .transpose()?;
        let variant = variant.or(file_variant).unwrap_or_default();

        let mut merged = serde_json::to_value(Self::for_variant(variant))?;
        merge_json(&mut merged, overrides);

        let mut config: AppConfig = serde_json::from_value(merged)?;
        config.variant = variant;
        Ok(config)
    }

    /// Session features to request. Hit-test placement always requires
    /// `hit-test`.
    pub fn effective_session_init(&self) -> SessionInit {
        let init = self.session_init.clone();
        if self.placement == PlacementMode::HitTest
            && !init.required_features.contains(&Feature::HitTest)
        {
            log::debug!("hit-test placement: adding hit-test to required features");
            return init.required(Feature::HitTest);
        }
        init
    }

    /// Log settings that are accepted but have no effect.
    pub fn warn_unused(&self) {
        if let Some(path) = &self.model_path {
            log::debug!("model_path {} is accepted but not used", path.display());
        }
    }
}

/// Lay `overlay` over `base`. Objects merge key by key; anything else replaces.
fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
