// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Lifecycle-managed 3D island scene for browser canvases and native
//! windows, built on wgpu.
//!
//! One [`SceneController`] owns a mounted scene: camera, light rig, orbit
//! controls, scene graph and render surface. It reaches its environment
//! only through the [`Host`] trait (frame scheduling, event subscriptions,
//! asynchronous asset loads) and draws through [`RenderSurface`].
//!
//! # Key entry points
//!
//! - [`lifecycle::SceneController`] - mount, frame loop, resize, deferred
//!   load and teardown
//! - [`options::Options`] - configuration with the `island` and
//!   `pan_locked` presets
//! - [`loader::GltfLoader`] - glTF decoding into a [`scene::LoadedAsset`]
//! - [`renderer::GpuSurface`] - shadowed forward renderer
//! - `Viewer` (feature `viewer`) and the `web` module (feature `web`) -
//!   the native and browser hosts
//!
//! # Architecture
//!
//! Hosts forward their callbacks (animation frames, resize, visibility,
//! pointer input, load completions) to the controller, which checks
//! liveness and load-ticket identity before touching any state. Loads run
//! outside the frame loop and are injected into the scene graph when they
//! complete; the renderer re-uploads geometry whenever the graph changed.

pub mod camera;
pub mod error;
pub mod gpu;
pub mod input;
pub mod lifecycle;
pub mod loader;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;
#[cfg(feature = "web")]
pub mod web;

pub use camera::{Camera, OrbitControls};
pub use error::SceneError;
pub use input::{InputEvent, MouseButton};
pub use lifecycle::{Host, SceneController, Viewport};
pub use loader::{AssetLoadError, AssetLoader, GltfLoader};
pub use options::{InteractionPolicy, MaterialOverride, Options};
pub use renderer::{GpuSurface, RenderError, RenderSurface};
pub use scene::{LoadedAsset, SceneGraph};
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
