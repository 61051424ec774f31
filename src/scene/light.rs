use glam::{Mat4, Vec3};

use crate::options::{LightingOptions, ShadowFilter};

/// Convert an sRGB-encoded channel to linear.
#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_color(c: [f32; 3]) -> Vec3 {
    Vec3::from_array(c.map(srgb_to_linear))
}

/// Orthographic shadow camera of the directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCamera {
    /// Whether the shadow pass runs.
    pub enabled: bool,
    /// Sampling filter.
    pub filter: ShadowFilter,
    /// Left bound in light space.
    pub left: f32,
    /// Right bound in light space.
    pub right: f32,
    /// Bottom bound in light space.
    pub bottom: f32,
    /// Top bound in light space.
    pub top: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
    /// Requested shadow map resolution (square).
    pub map_size: u32,
    /// Depth bias added during comparison.
    pub bias: f32,
}

/// Shadow-casting directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Linear RGB color.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Light position.
    pub position: Vec3,
    /// Point the light shines toward.
    pub target: Vec3,
    /// Shadow frustum and map parameters.
    pub shadow: ShadowCamera,
}

impl DirectionalLight {
    /// Unit vector the light travels along.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }

    /// Light-space view-projection used for the shadow pass.
    #[must_use]
    pub fn shadow_view_projection(&self) -> Mat4 {
        let dir = self.direction();
        let up = if dir.cross(Vec3::Y).length_squared() < 1e-10 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let s = &self.shadow;
        let proj = Mat4::orthographic_rh(
            s.left, s.right, s.bottom, s.top, s.near, s.far,
        );
        proj * view
    }
}

/// Uniform ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB color.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
}

/// The fixed light setup of a scene: one directional light and one ambient
/// light. Built once at mount and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    /// The sun.
    pub directional: DirectionalLight,
    /// The fill.
    pub ambient: AmbientLight,
}

impl LightRig {
    /// Build the rig, converting the configured sRGB colors to linear.
    #[must_use]
    pub fn from_options(options: &LightingOptions) -> Self {
        let s = &options.shadow;
        Self {
            directional: DirectionalLight {
                color: linear_color(options.directional_color),
                intensity: options.directional_intensity,
                position: Vec3::from_array(options.directional_position),
                target: Vec3::from_array(options.directional_target),
                shadow: ShadowCamera {
                    enabled: s.enabled,
                    filter: s.filter,
                    left: s.left,
                    right: s.right,
                    bottom: s.bottom,
                    top: s.top,
                    near: s.near,
                    far: s.far,
                    map_size: s.map_size.max(1),
                    bias: s.bias,
                },
            },
            ambient: AmbientLight {
                color: linear_color(options.ambient_color),
                intensity: options.ambient_intensity,
            },
        }
    }
}
