//! Shared utilities for the scene runtime.

/// Smoothed FPS tracking.
pub mod frame_timing;
