use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Debug helper geometry drawn alongside the scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Debug", inline)]
#[serde(default)]
pub struct DebugOptions {
    /// Draw RGB world axes at the origin.
    #[schemars(title = "Show Axes")]
    pub show_axes: bool,
    /// Length of each axis line.
    #[schemars(skip)]
    pub axes_size: f32,
    /// Draw a gizmo at the directional light pointing at its target.
    #[schemars(title = "Show Light Helper")]
    pub show_light_helper: bool,
    /// Half-extent of the light gizmo's square.
    #[schemars(skip)]
    pub light_helper_size: f32,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            show_axes: true,
            axes_size: 50.0,
            show_light_helper: true,
            light_helper_size: 12.0,
        }
    }
}
