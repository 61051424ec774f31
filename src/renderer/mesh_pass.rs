//! Lit indexed-mesh draw pass.
//!
//! Every scene mesh is uploaded once per graph generation as a [`GpuMesh`]
//! (own vertex, index and uniform buffers). The same `GpuMesh` list feeds
//! both the shadow pass and the lit pass, which differ only in pipeline
//! and frame bind group.

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::pipeline_util;
use super::uniforms::{MeshUniform, MeshVertex};
use crate::gpu::pipeline_helpers;
use crate::scene::{Mesh, SceneGraph};

/// Layout of the per-mesh bind group (group 1 in both mesh shaders).
pub(crate) fn mesh_bind_group_layout(
    device: &wgpu::Device,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Mesh Bind Group Layout"),
        entries: &[pipeline_helpers::uniform_buffer(
            0,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        )],
    })
}

/// Create an indexed-mesh render pipeline over [`MeshVertex`] buffers.
pub(crate) fn create_mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    targets: &[Option<wgpu::ColorTargetState>],
    depth_stencil: wgpu::DepthStencilState,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Layout")),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets,
            compilation_options: Default::default(),
        }),
        // glTF islands are frequently single-sided; draw both faces.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil),
        multisample: pipeline_util::multisample(sample_count),
        multiview: None,
        cache: None,
    })
}

/// Interleave positions and normals. Missing normals default to +Y.
pub(crate) fn mesh_vertices(mesh: &Mesh) -> Vec<MeshVertex> {
    let data = &mesh.data;
    data.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| MeshVertex {
            position,
            normal: data.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            color: data.colors.get(i).copied().unwrap_or([1.0; 4]),
        })
        .collect()
}

/// A mesh resident on the GPU.
pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    bind_group: wgpu::BindGroup,
    pub(crate) cast_shadow: bool,
}

impl GpuMesh {
    /// Upload `mesh` at its world transform. Returns `None` for meshes
    /// without triangles.
    pub(crate) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        world: Mat4,
        mesh: &Mesh,
    ) -> Option<Self> {
        if mesh.data.indices.len() < 3 || mesh.data.positions.is_empty() {
            return None;
        }
        let vertices = mesh_vertices(mesh);
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let uniform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Uniform Buffer"),
                contents: bytemuck::bytes_of(&MeshUniform::new(world, mesh)),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.data.indices.len() as u32,
            bind_group,
            cast_shadow: mesh.cast_shadow,
        })
    }

    /// Bind this mesh at group 1 and draw it.
    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(
            self.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Upload every mesh of the graph.
pub(crate) fn upload_scene(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &SceneGraph,
) -> Vec<GpuMesh> {
    let world = scene.world_matrices();
    scene
        .iter()
        .filter_map(|(id, node)| {
            let mesh = node.mesh()?;
            GpuMesh::new(device, layout, world[id.index()], mesh)
        })
        .collect()
}

/// The lit pass: pipeline plus the frame bind group (camera, light,
/// shadow map, comparison sampler).
pub(crate) struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    frame_bind_group: wgpu::BindGroup,
}

impl MeshPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        mesh_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        light_buffer: &wgpu::Buffer,
        shadow_view: &wgpu::TextureView,
    ) -> Self {
        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[
                    pipeline_helpers::uniform_buffer(
                        0,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                    pipeline_helpers::uniform_buffer(
                        1,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                    pipeline_helpers::depth_texture_2d(2),
                    pipeline_helpers::comparison_sampler(3),
                ],
            });
        let sampler = pipeline_helpers::shadow_sampler(device);
        let frame_bind_group = Self::frame_bind_group(
            device,
            &frame_layout,
            camera_buffer,
            light_buffer,
            shadow_view,
            &sampler,
        );

        let shader = pipeline_helpers::shader_module(
            device,
            "Mesh Shader",
            include_str!("../../assets/shaders/mesh.wgsl"),
        );
        let pipeline = create_mesh_pipeline(
            device,
            "Mesh Pipeline",
            &shader,
            &[&frame_layout, mesh_layout],
            &pipeline_util::color_targets(format),
            pipeline_util::depth_stencil_state(),
            sample_count,
        );

        Self {
            pipeline,
            frame_bind_group,
        }
    }

    fn frame_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        light_buffer: &wgpu::Buffer,
        shadow_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub(crate) fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        meshes: &[GpuMesh],
    ) {
        if meshes.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for mesh in meshes {
            mesh.draw(render_pass);
        }
    }
}
