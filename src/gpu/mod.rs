//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, growable buffers, render
//! targets and bind-group boilerplate.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate helpers for bind groups and samplers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Depth, multisample and shadow-map render targets.
pub mod texture;
