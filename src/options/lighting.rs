use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shadow-map filtering mode.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ShadowFilter {
    /// Single depth comparison per fragment.
    Hard,
    /// 2x2 percentage-closer filtering.
    Pcf,
    /// 3x3 percentage-closer filtering with softened edges.
    #[default]
    PcfSoft,
}

impl ShadowFilter {
    /// Kernel radius (in shadow-map texels) sampled around each fragment.
    #[must_use]
    pub fn kernel_radius(self) -> u32 {
        match self {
            Self::Hard => 0,
            Self::Pcf => 1,
            Self::PcfSoft => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Shadows", inline)]
#[serde(default)]
/// Directional-light shadow frustum and sampling parameters.
pub struct ShadowOptions {
    /// Whether shadow maps are rendered and sampled at all.
    #[schemars(title = "Shadows")]
    pub enabled: bool,
    /// Filtering applied when sampling the shadow map.
    #[schemars(title = "Filter")]
    pub filter: ShadowFilter,
    /// Top bound of the orthographic shadow frustum.
    #[schemars(skip)]
    pub top: f32,
    /// Bottom bound of the orthographic shadow frustum.
    #[schemars(skip)]
    pub bottom: f32,
    /// Left bound of the orthographic shadow frustum.
    #[schemars(skip)]
    pub left: f32,
    /// Right bound of the orthographic shadow frustum.
    #[schemars(skip)]
    pub right: f32,
    /// Near plane of the shadow frustum.
    #[schemars(skip)]
    pub near: f32,
    /// Far plane of the shadow frustum.
    #[schemars(skip)]
    pub far: f32,
    /// Shadow map resolution (square, in texels).
    #[schemars(skip)]
    pub map_size: u32,
    /// Depth bias; small negative values suppress shadow acne.
    #[schemars(title = "Bias", range(min = -0.01, max = 0.0), extend("step" = 0.0001))]
    pub bias: f32,
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: ShadowFilter::PcfSoft,
            top: 50.0,
            bottom: -50.0,
            left: -50.0,
            right: 50.0,
            near: 0.5,
            far: 500.0,
            map_size: 4096,
            bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// One shadow-casting directional light plus one ambient light.
pub struct LightingOptions {
    /// Directional light color (linear RGB).
    #[schemars(skip)]
    pub directional_color: [f32; 3],
    /// Directional light intensity.
    #[schemars(title = "Sun", range(min = 0.0, max = 10.0), extend("step" = 0.1))]
    pub directional_intensity: f32,
    /// Directional light position; the light shines toward `directional_target`.
    #[schemars(skip)]
    pub directional_position: [f32; 3],
    /// Point the directional light aims at.
    #[schemars(skip)]
    pub directional_target: [f32; 3],
    /// Ambient light color (linear RGB).
    #[schemars(skip)]
    pub ambient_color: [f32; 3],
    /// Ambient light intensity.
    #[schemars(title = "Ambient", range(min = 0.0, max = 60.0), extend("step" = 0.5))]
    pub ambient_intensity: f32,
    /// Shadow configuration for the directional light.
    pub shadow: ShadowOptions,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 3.0,
            directional_position: [30.0, 60.0, -30.0],
            directional_target: [0.0, 0.0, 0.0],
            // 0x404040 in sRGB
            ambient_color: [0.25, 0.25, 0.25],
            ambient_intensity: 40.0,
            shadow: ShadowOptions::default(),
        }
    }
}
