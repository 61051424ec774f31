use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which camera interactions a scene instance allows.
///
/// Chosen once when the controller is mounted; it is never switched at
/// runtime.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum InteractionPolicy {
    /// Rotate, pan and zoom; left rotates, middle dollies, right pans.
    #[default]
    Free,
    /// Rotation disabled; left pans, middle dollies, right does nothing.
    PanLocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
/// Orbit-control tuning.
pub struct ControlOptions {
    /// Interaction restrictions for this instance.
    #[schemars(skip)]
    pub policy: InteractionPolicy,
    /// Fraction of the remaining motion applied per frame (inertia).
    #[schemars(title = "Damping", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Rotation sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Zoom sensitivity multiplier.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub zoom_speed: f32,
    /// Pan sensitivity multiplier.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub pan_speed: f32,
    /// Closest allowed distance between eye and target.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Farthest allowed distance between eye and target.
    #[schemars(skip)]
    pub max_distance: f32,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            policy: InteractionPolicy::Free,
            damping_factor: 0.1,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: 1000.0,
        }
    }
}
