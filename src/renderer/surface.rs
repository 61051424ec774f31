//! wgpu implementation of [`RenderSurface`].

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::line_pass::LinePass;
use super::mesh_pass::{self, GpuMesh, MeshPass};
use super::shadow_pass::ShadowPass;
use super::uniforms::{CameraUniform, LightUniform};
use super::{RenderError, RenderSurface};
use crate::camera::Camera;
use crate::gpu::render_context::GpuContext;
use crate::gpu::texture::RenderTarget;
use crate::lifecycle::Viewport;
use crate::options::Options;
use crate::scene::{LightRig, SceneGraph};

/// Forward renderer presenting to a canvas or window surface.
///
/// All GPU state lives behind one `Option` so that
/// [`release`](RenderSurface::release) drops the device, queue and
/// surface in one step.
pub struct GpuSurface {
    state: Option<GpuState>,
}

struct GpuState {
    context: GpuContext,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    mesh_layout: wgpu::BindGroupLayout,
    shadow: ShadowPass,
    meshes_pass: MeshPass,
    lines: LinePass,
    meshes: Vec<GpuMesh>,
    depth: RenderTarget,
    msaa: Option<RenderTarget>,
    clear_color: wgpu::Color,
}

impl GpuSurface {
    /// Build the passes for an initialized context.
    #[must_use]
    pub fn new(context: GpuContext, options: &Options) -> Self {
        let device = &context.device;
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::bytes_of(&CameraUniform::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let light_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Light Uniform Buffer"),
                contents: bytemuck::bytes_of(&LightUniform::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let mesh_layout = mesh_pass::mesh_bind_group_layout(device);
        let shadow = ShadowPass::new(
            device,
            &mesh_layout,
            &light_buffer,
            options.lighting.shadow.map_size,
        );
        let meshes_pass = MeshPass::new(
            device,
            context.format(),
            context.sample_count,
            &mesh_layout,
            &camera_buffer,
            &light_buffer,
            shadow.view(),
        );
        let lines = LinePass::new(
            device,
            context.format(),
            context.sample_count,
            &camera_buffer,
        );

        let (depth, msaa) = Self::targets(&context);
        let [r, g, b, a] = options.render.clear_color.map(f64::from);

        Self {
            state: Some(GpuState {
                context,
                camera_buffer,
                light_buffer,
                mesh_layout,
                shadow,
                meshes_pass,
                lines,
                meshes: Vec::new(),
                depth,
                msaa,
                // Premultiplied like everything else written to the target.
                clear_color: wgpu::Color {
                    r: r * a,
                    g: g * a,
                    b: b * a,
                    a,
                },
            }),
        }
    }

    fn targets(context: &GpuContext) -> (RenderTarget, Option<RenderTarget>) {
        let (w, h) = (context.width(), context.height());
        let depth =
            RenderTarget::depth(&context.device, w, h, context.sample_count);
        let msaa = (context.sample_count > 1).then(|| {
            RenderTarget::msaa_color(
                &context.device,
                w,
                h,
                context.format(),
                context.sample_count,
            )
        });
        (depth, msaa)
    }

    /// The GPU context, or `None` once released.
    #[must_use]
    pub fn context(&self) -> Option<&GpuContext> {
        self.state.as_ref().map(|s| &s.context)
    }

    /// Whether [`release`](RenderSurface::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    /// Number of meshes resident on the GPU.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.meshes.len())
    }
}

impl GpuState {
    fn upload(&mut self, scene: &SceneGraph) {
        let device = &self.context.device;
        self.meshes = mesh_pass::upload_scene(device, &self.mesh_layout, scene);
        self.lines.upload(device, &self.context.queue, scene);
        log::debug!(
            "uploaded scene generation {}: {} meshes",
            scene.generation(),
            self.meshes.len()
        );
    }

    fn acquire(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.context.get_next_frame() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::Timeout) => Err(RenderError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(RenderError::OutOfMemory)
            }
            Err(e) => Err(RenderError::Backend(e.to_string())),
        }
    }
}

impl RenderSurface for GpuSurface {
    fn resize(&mut self, viewport: Viewport) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if viewport.is_empty() {
            return;
        }
        state.context.resize(viewport.width, viewport.height);
        let (depth, msaa) = Self::targets(&state.context);
        state.depth = depth;
        state.msaa = msaa;
    }

    fn render(
        &mut self,
        scene: &mut SceneGraph,
        lights: &LightRig,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::Released)?;

        if scene.is_dirty() {
            state.upload(scene);
            scene.mark_rendered();
        }

        let queue = &state.context.queue;
        queue.write_buffer(
            &state.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );
        queue.write_buffer(
            &state.light_buffer,
            0,
            bytemuck::bytes_of(&LightUniform::from_rig(
                lights,
                state.shadow.size(),
            )),
        );

        let frame = state.acquire()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = state.context.create_encoder();

        if lights.directional.shadow.enabled {
            state.shadow.encode(&mut encoder, &state.meshes);
        }

        {
            let (target, resolve_target) = match &state.msaa {
                Some(msaa) => (&msaa.view, Some(&view)),
                None => (&view, None),
            };
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: target,
                            resolve_target,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(state.clear_color),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &state.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Discard,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    ..Default::default()
                });
            state.meshes_pass.draw(&mut pass, &state.meshes);
            state.lines.draw(&mut pass);
        }

        state.context.submit(encoder);
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!(
                "releasing GPU surface ({} meshes)",
                state.meshes.len()
            );
            state.context.device.destroy();
        }
    }
}
