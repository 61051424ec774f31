//! Unlit line pass for axes and light helpers.

use super::pipeline_util;
use super::uniforms::LineVertex;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::pipeline_helpers;
use crate::scene::{NodeKind, SceneGraph};

/// World-space line-list vertices of every helper in the graph.
pub(crate) fn helper_vertices(scene: &SceneGraph) -> Vec<LineVertex> {
    let world = scene.world_matrices();
    let mut vertices = Vec::new();
    for (id, node) in scene.iter() {
        let NodeKind::Helper(helper) = &node.kind else {
            continue;
        };
        let m = world[id.index()];
        for (a, b, color) in helper.segments() {
            vertices.push(LineVertex {
                position: m.transform_point3(a).to_array(),
                color,
            });
            vertices.push(LineVertex {
                position: m.transform_point3(b).to_array(),
                color,
            });
        }
    }
    vertices
}

pub(crate) struct LinePass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertices: DynamicBuffer<LineVertex>,
}

impl LinePass {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        camera_buffer: &wgpu::Buffer,
    ) -> Self {
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Line Bind Group Layout"),
                entries: &[pipeline_helpers::uniform_buffer(
                    0,
                    wgpu::ShaderStages::VERTEX,
                )],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Line Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let shader = pipeline_helpers::shader_module(
            device,
            "Line Shader",
            include_str!("../../assets/shaders/lines.wgsl"),
        );
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Line Pipeline Layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Line Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[LineVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &pipeline_util::color_targets(format),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_util::depth_stencil_state()),
                multisample: pipeline_util::multisample(sample_count),
                multiview: None,
                cache: None,
            });

        Self {
            pipeline,
            bind_group,
            vertices: DynamicBuffer::new(
                device,
                "Line Vertex Buffer",
                64,
                wgpu::BufferUsages::VERTEX,
            ),
        }
    }

    /// Replace the uploaded helper geometry.
    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
    ) {
        let vertices = helper_vertices(scene);
        if self.vertices.write(device, queue, &vertices) {
            log::debug!("line buffer grown to {} vertices", vertices.len());
        }
    }

    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.vertices.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        render_pass.draw(0..self.vertices.len() as u32, 0..1);
    }
}
