//! Depth-only shadow-map pass from the directional light.

use super::mesh_pass::{create_mesh_pipeline, GpuMesh};
use super::pipeline_util;
use crate::gpu::pipeline_helpers;
use crate::gpu::texture::RenderTarget;

/// Clamp a requested map size to what the device can allocate.
pub(crate) fn clamp_map_size(requested: u32, max_dimension: u32) -> u32 {
    requested.clamp(1, max_dimension.max(1))
}

pub(crate) struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    light_bind_group: wgpu::BindGroup,
    map: RenderTarget,
    size: u32,
}

impl ShadowPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        mesh_layout: &wgpu::BindGroupLayout,
        light_buffer: &wgpu::Buffer,
        requested_size: u32,
    ) -> Self {
        let size = clamp_map_size(
            requested_size,
            device.limits().max_texture_dimension_2d,
        );
        if size != requested_size {
            log::warn!(
                "shadow map size {requested_size} exceeds device limit, \
                 using {size}"
            );
        }

        let light_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Light Bind Group Layout"),
                entries: &[pipeline_helpers::uniform_buffer(
                    0,
                    wgpu::ShaderStages::VERTEX,
                )],
            });
        let light_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Light Bind Group"),
                layout: &light_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: light_buffer.as_entire_binding(),
                }],
            });

        let shader = pipeline_helpers::shader_module(
            device,
            "Shadow Shader",
            include_str!("../../assets/shaders/shadow.wgsl"),
        );
        let pipeline = create_mesh_pipeline(
            device,
            "Shadow Pipeline",
            &shader,
            &[&light_layout, mesh_layout],
            &[],
            pipeline_util::shadow_depth_state(),
            1,
        );

        Self {
            pipeline,
            light_bind_group,
            map: RenderTarget::shadow_map(device, size),
            size,
        }
    }

    /// Allocated map resolution.
    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    /// Depth view sampled by the lit pass.
    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.map.view
    }

    /// Render the shadow-casting meshes into the map. The map is always
    /// cleared so disabling casters leaves no stale shadows.
    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        meshes: &[GpuMesh],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.light_bind_group, &[]);
        for mesh in meshes.iter().filter(|m| m.cast_shadow) {
            mesh.draw(&mut pass);
        }
    }
}
