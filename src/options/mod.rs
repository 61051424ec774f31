//! Centralized scene options with TOML preset support.
//!
//! Every tweakable setting of a scene instance (camera, lighting, controls,
//! asset placement, render surface, debug helpers) is consolidated here.
//! Options serialize to/from TOML for the presets stored in
//! `assets/presets/`.

mod asset;
mod camera;
mod controls;
mod debug;
mod lighting;
mod render;

use std::path::Path;

pub use asset::{AssetOptions, MaterialOverride};
pub use camera::CameraOptions;
pub use controls::{ControlOptions, InteractionPolicy};
pub use debug::DebugOptions;
pub use lighting::{LightingOptions, ShadowFilter, ShadowOptions};
pub use render::RenderOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
///
/// The default is the [`island`](Self::island) preset.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and starting pose.
    pub camera: CameraOptions,
    /// Directional + ambient light rig.
    pub lighting: LightingOptions,
    /// Orbit-control policy and tuning.
    pub controls: ControlOptions,
    /// Asset source, placement and material adjustment.
    pub asset: AssetOptions,
    /// Render-surface configuration.
    pub render: RenderOptions,
    /// Debug helper geometry.
    pub debug: DebugOptions,
}

impl Options {
    /// Free-orbit island view: full controls, asset loaded as soon as the
    /// scene mounts, smooth (zero-roughness) materials, debug helpers on.
    #[must_use]
    pub fn island() -> Self {
        Self::default()
    }

    /// Pan-locked island view: rotation disabled, asset loaded lazily once
    /// the surface is visible, reduced metalness, biased shadows.
    #[must_use]
    pub fn pan_locked() -> Self {
        Self {
            camera: CameraOptions {
                position: [0.0, 40.0, 25.0],
                ..CameraOptions::default()
            },
            lighting: LightingOptions {
                directional_position: [-30.0, 60.0, 30.0],
                ambient_intensity: 35.0,
                shadow: ShadowOptions {
                    bias: -0.0005,
                    ..ShadowOptions::default()
                },
                ..LightingOptions::default()
            },
            controls: ControlOptions {
                policy: InteractionPolicy::PanLocked,
                ..ControlOptions::default()
            },
            asset: AssetOptions {
                lazy_load: true,
                material_override: MaterialOverride::Metalness(0.25),
                ..AssetOptions::default()
            },
            render: RenderOptions::default(),
            debug: DebugOptions {
                show_axes: false,
                show_light_helper: false,
                ..DebugOptions::default()
            },
        }
    }

    /// Built-in preset by name (`"island"` or `"pan_locked"`).
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "island" => Some(Self::island()),
            "pan_locked" => Some(Self::pan_locked()),
            _ => None,
        }
    }

    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SceneError> {
        toml::from_str(content)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path).map_err(SceneError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SceneError::Io)?;
        }
        std::fs::write(path, content).map_err(SceneError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
