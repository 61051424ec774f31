//! Asynchronous scene-asset loading.
//!
//! The scene controller never decodes assets itself: it hands an
//! [`AssetRequest`] to the host, which drives an [`AssetLoader`] future and
//! delivers the result back through the controller's completion path.
//! [`GltfLoader`] is the stock loader; it pulls bytes through a [`Fetch`]
//! implementation so the same decoding runs natively and in the browser.

mod error;
mod fetch;
mod gltf_loader;

pub use error::AssetLoadError;
#[cfg(not(target_arch = "wasm32"))]
pub use fetch::FileFetcher;
#[cfg(feature = "web")]
pub use fetch::WebFetcher;
#[cfg(feature = "viewer")]
pub use fetch::{HttpFetcher, NativeFetcher};
use futures::future::LocalBoxFuture;
pub use gltf_loader::{resolve_uri, GltfLoader, DRACO_EXTENSION};

use crate::lifecycle::LoadTicket;
use crate::scene::LoadedAsset;

/// Everything a loader needs to produce one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Identifies this load for cancellation and completion.
    pub ticket: LoadTicket,
    /// Document URL (or native path).
    pub url: String,
    /// Location of the mesh-decompression support files.
    pub decoder_path: Option<String>,
}

/// Result of one load.
pub type LoadResult = Result<LoadedAsset, AssetLoadError>;

/// Produces decoded assets asynchronously.
pub trait AssetLoader {
    /// Start loading. The future owns everything it needs.
    fn load(&self, request: &AssetRequest) -> LocalBoxFuture<'static, LoadResult>;
}

/// Byte transport used by loaders.
pub trait Fetch {
    /// Retrieve the full body at `url`.
    fn fetch(
        &self,
        url: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetLoadError>>;
}

/// Decoder for documents whose meshes are stored compressed
/// (`KHR_draco_mesh_compression`).
///
/// The codec itself lives outside this crate; an implementation receives the
/// parsed document with all buffers resolved and returns the decoded
/// subtree.
pub trait CompressedMeshDecoder {
    /// Decode the document.
    ///
    /// `decoder_path` is the configured location of the codec's support
    /// files, passed through unchanged.
    fn decode(
        &self,
        decoder_path: Option<&str>,
        document: &gltf::Document,
        buffers: &[Vec<u8>],
    ) -> LoadResult;
}
