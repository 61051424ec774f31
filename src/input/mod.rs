//! Platform-agnostic pointer input fed to the orbit controls.

/// Platform-agnostic input events.
pub mod event;

pub use event::{InputEvent, MouseButton};
