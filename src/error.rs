//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::GpuContextError;
use crate::lifecycle::LoadTicket;
use crate::loader::AssetLoadError;

/// Errors produced by the isle crate.
#[derive(Debug)]
pub enum SceneError {
    /// No render surface (canvas) could be resolved for the controller.
    MissingSurface(String),
    /// The viewport has zero width or height.
    InvalidViewport {
        /// Viewport width in physical pixels.
        width: u32,
        /// Viewport height in physical pixels.
        height: u32,
    },
    /// Fetching or decoding the scene asset failed.
    AssetLoad(AssetLoadError),
    /// A load completion arrived after the controller was torn down.
    TeardownRace(LoadTicket),
    /// A load completion arrived for a ticket that is not pending.
    StaleLoad(LoadTicket),
    /// GPU context initialization failure.
    Gpu(GpuContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSurface(what) => {
                write!(f, "no render surface found: {what}")
            }
            Self::InvalidViewport { width, height } => {
                write!(f, "invalid viewport size {width}x{height}")
            }
            Self::AssetLoad(e) => write!(f, "asset load error: {e}"),
            Self::TeardownRace(ticket) => {
                write!(f, "load {ticket} completed after teardown")
            }
            Self::StaleLoad(ticket) => {
                write!(f, "load {ticket} is not pending")
            }
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AssetLoad(e) => Some(e),
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AssetLoadError> for SceneError {
    fn from(e: AssetLoadError) -> Self {
        Self::AssetLoad(e)
    }
}

impl From<GpuContextError> for SceneError {
    fn from(e: GpuContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
