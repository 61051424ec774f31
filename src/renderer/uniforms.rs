//! GPU-side uniform and vertex layouts. Each struct must match its WGSL
//! counterpart in `assets/shaders/` byte for byte.

use glam::Mat4;

use crate::camera::Camera;
use crate::scene::{LightRig, Mesh};

/// Camera uniform (80 bytes).
///
/// WGSL layout:
///   view_proj: mat4x4<f32>    (offset 0)
///   eye: vec3<f32>            (offset 64, align 16)
///   _pad: f32                 (offset 76)
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub eye: [f32; 3],
    pub(crate) _pad: f32,
}

impl CameraUniform {
    /// Snapshot the camera.
    #[must_use]
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.build_matrix().to_cols_array_2d(),
            eye: camera.eye.to_array(),
            _pad: 0.0,
        }
    }
}

/// Light rig uniform (128 bytes).
///
/// WGSL layout:
///   view_proj: mat4x4<f32>      (offset 0)
///   direction: vec3<f32>        (offset 64, align 16)
///   intensity: f32              (offset 76)
///   color: vec3<f32>            (offset 80, align 16)
///   ambient_intensity: f32      (offset 92)
///   ambient_color: vec3<f32>    (offset 96, align 16)
///   bias: f32                   (offset 108)
///   texel_size: f32             (offset 112)
///   pcf_radius: f32             (offset 116)
///   shadows_enabled: f32        (offset 120)
///   _pad: f32                   (offset 124)
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Light-space view-projection of the shadow camera.
    pub view_proj: [[f32; 4]; 4],
    /// Direction the light travels (normalized).
    pub direction: [f32; 3],
    /// Directional intensity.
    pub intensity: f32,
    /// Directional color (linear).
    pub color: [f32; 3],
    /// Ambient intensity.
    pub ambient_intensity: f32,
    /// Ambient color (linear).
    pub ambient_color: [f32; 3],
    /// Added to the fragment's light-space depth before comparison.
    pub bias: f32,
    /// Size of one shadow-map texel in UV units.
    pub texel_size: f32,
    /// PCF kernel radius in texels (0 = single tap).
    pub pcf_radius: f32,
    /// 1.0 when shadows are sampled, 0.0 otherwise.
    pub shadows_enabled: f32,
    pub(crate) _pad: f32,
}

impl LightUniform {
    /// Snapshot the rig for a shadow map of `map_size` texels.
    #[must_use]
    pub fn from_rig(lights: &LightRig, map_size: u32) -> Self {
        let sun = &lights.directional;
        let shadow = &sun.shadow;
        Self {
            view_proj: sun.shadow_view_projection().to_cols_array_2d(),
            direction: sun.direction().to_array(),
            intensity: sun.intensity,
            color: sun.color.to_array(),
            ambient_intensity: lights.ambient.intensity,
            ambient_color: lights.ambient.color.to_array(),
            bias: shadow.bias,
            texel_size: 1.0 / map_size.max(1) as f32,
            pcf_radius: shadow.filter.kernel_radius() as f32,
            shadows_enabled: if shadow.enabled { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

/// Per-mesh uniform (160 bytes).
///
/// WGSL layout:
///   model: mat4x4<f32>          (offset 0)
///   normal_matrix: mat4x4<f32>  (offset 64)
///   base_color: vec4<f32>       (offset 128)
///   roughness: f32              (offset 144)
///   metalness: f32              (offset 148)
///   receive_shadow: f32         (offset 152)
///   _pad: f32                   (offset 156)
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    /// Mesh-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model` for normals.
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// Roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
    /// 1.0 when the mesh samples the shadow map.
    pub receive_shadow: f32,
    pub(crate) _pad: f32,
}

impl MeshUniform {
    /// Snapshot a mesh at its world transform.
    #[must_use]
    pub fn new(world: Mat4, mesh: &Mesh) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            base_color: mesh.material.base_color,
            roughness: mesh.material.roughness,
            metalness: mesh.material.metalness,
            receive_shadow: if mesh.receive_shadow { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

/// Lit mesh vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MeshVertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
    pub(crate) color: [f32; 4],
}

impl MeshVertex {
    pub(crate) const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unlit helper-line vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LineVertex {
    pub(crate) position: [f32; 3],
    pub(crate) color: [f32; 3],
}

impl LineVertex {
    pub(crate) const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::options::{CameraOptions, LightingOptions};
    use crate::scene::{Material, MeshData};

    #[test]
    fn layouts_match_wgsl_sizes() {
        assert_eq!(size_of::<CameraUniform>(), 80);
        assert_eq!(size_of::<LightUniform>(), 128);
        assert_eq!(size_of::<MeshUniform>(), 160);
        assert_eq!(size_of::<MeshVertex>(), 40);
        assert_eq!(size_of::<LineVertex>(), 24);
    }

    #[test]
    fn light_uniform_reflects_shadow_settings() {
        let mut options = LightingOptions::default();
        options.shadow.bias = -0.0005;
        let u = LightUniform::from_rig(&LightRig::from_options(&options), 2048);
        assert_eq!(u.bias, -0.0005);
        assert_eq!(u.texel_size, 1.0 / 2048.0);
        assert_eq!(u.pcf_radius, 2.0);
        assert_eq!(u.shadows_enabled, 1.0);
        assert_eq!(u.intensity, 3.0);
    }

    #[test]
    fn mesh_uniform_carries_material_and_shadow_flag() {
        let mut mesh = Mesh::new(
            MeshData::default(),
            Material {
                roughness: 0.0,
                metalness: 0.25,
                ..Material::default()
            },
        );
        mesh.receive_shadow = true;
        let world = Mat4::from_scale(Vec3::splat(0.9));
        let u = MeshUniform::new(world, &mesh);
        assert_eq!(u.receive_shadow, 1.0);
        assert_eq!(u.metalness, 0.25);
        assert_eq!(u.model, world.to_cols_array_2d());
    }

    #[test]
    fn camera_uniform_snapshots_eye() {
        let camera = Camera::from_options(&CameraOptions::default(), 1.0);
        let u = CameraUniform::from_camera(&camera);
        assert_eq!(u.eye, [0.0, 35.0, 0.0]);
    }
}
