//! Camera system for the scene view.
//!
//! Provides a perspective camera, damped orbit controls with per-instance
//! interaction policies, and pointer gesture tracking.

/// Damped orbit controls and policy-derived button bindings.
pub mod controller;
/// Core camera struct with cached projection.
pub mod core;
/// Pointer gesture tracking that drives the orbit controls.
pub mod input;

pub use self::controller::{ControlBindings, OrbitControls, PointerAction};
pub use self::core::Camera;
pub use self::input::InputHandler;
