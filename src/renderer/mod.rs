//! Rendering of the scene graph.
//!
//! The scene controller only knows the [`RenderSurface`] trait. The stock
//! implementation, [`GpuSurface`], is a small wgpu forward renderer: a
//! directional shadow-map pass, a lit mesh pass with percentage-closer
//! shadow filtering, and an unlit line pass for debug helpers.

use std::fmt;

use crate::camera::Camera;
use crate::lifecycle::Viewport;
use crate::scene::{LightRig, SceneGraph};

mod line_pass;
mod mesh_pass;
pub(crate) mod pipeline_util;
mod shadow_pass;
mod surface;
mod uniforms;

pub use surface::GpuSurface;
pub use uniforms::{CameraUniform, LightUniform, MeshUniform};

/// Errors a surface can report for a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The swapchain was lost or outdated and has been reconfigured.
    SurfaceLost,
    /// Acquiring the next frame timed out.
    Timeout,
    /// The GPU ran out of memory.
    OutOfMemory,
    /// The surface was already released.
    Released,
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceLost => write!(f, "surface lost"),
            Self::Timeout => write!(f, "timed out acquiring frame"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::Released => write!(f, "surface already released"),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Target the frame driver renders into.
pub trait RenderSurface {
    /// Match the backing store to a new viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Draw the whole scene graph from `camera`.
    ///
    /// Implementations re-upload geometry when the graph is dirty and mark
    /// it rendered afterwards.
    fn render(
        &mut self,
        scene: &mut SceneGraph,
        lights: &LightRig,
        camera: &Camera,
    ) -> Result<(), RenderError>;

    /// Free all GPU resources. Later `render` calls return
    /// [`RenderError::Released`].
    fn release(&mut self);
}
