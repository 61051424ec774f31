use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Render", inline)]
#[serde(default)]
/// Render-surface configuration.
pub struct RenderOptions {
    /// Multisample the color target (4x).
    #[schemars(title = "Antialias")]
    pub antialias: bool,
    /// Keep the surface transparent where nothing is drawn.
    #[schemars(skip)]
    pub alpha: bool,
    /// Clear color (linear RGBA).
    #[schemars(skip)]
    pub clear_color: [f32; 4],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: true,
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}
