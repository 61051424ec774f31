use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Material adjustment applied to every mesh of the loaded asset.
///
/// Values are clamped to `[0, 1]` when applied.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MaterialOverride {
    /// Keep the materials as authored.
    #[default]
    None,
    /// Replace the roughness factor.
    Roughness(f32),
    /// Replace the metalness factor.
    Metalness(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Asset", inline)]
#[serde(default)]
/// Where the scene asset comes from and how it is placed.
pub struct AssetOptions {
    /// URL (or native path) of the glTF document.
    #[schemars(skip)]
    pub url: String,
    /// Location of the mesh-decompression support files, handed to the
    /// compressed-mesh decoder.
    #[schemars(skip)]
    pub decoder_path: Option<String>,
    /// Defer loading until the surface first becomes visible.
    #[schemars(title = "Lazy Load")]
    pub lazy_load: bool,
    /// Translation of the asset root.
    #[schemars(skip)]
    pub position: [f32; 3],
    /// Uniform scale of the asset root.
    #[schemars(title = "Scale", range(min = 0.1, max = 5.0), extend("step" = 0.05))]
    pub scale: f32,
    /// Material adjustment applied to every mesh.
    #[schemars(skip)]
    pub material_override: MaterialOverride,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            url: "assets/models/RoosIsland.gltf".into(),
            decoder_path: None,
            lazy_load: false,
            position: [-5.0, 0.0, 0.0],
            scale: 0.9,
            material_override: MaterialOverride::Roughness(0.0),
        }
    }
}
