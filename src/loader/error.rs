//! Error types for asset loading.

use std::fmt;

/// Errors that can occur while fetching or decoding a scene asset.
#[derive(Debug)]
pub enum AssetLoadError {
    /// The document or one of its buffers could not be retrieved.
    Fetch {
        /// Resource that failed.
        url: String,
        /// Transport-level reason.
        reason: String,
    },
    /// The glTF document is malformed.
    Parse(gltf::Error),
    /// A buffer is absent or shorter than declared.
    MissingBuffer {
        /// Buffer index in the document.
        index: usize,
    },
    /// A `data:` URI buffer could not be decoded.
    InvalidDataUri(String),
    /// A primitive lacks a required vertex attribute.
    MissingAttribute {
        /// Mesh index in the document.
        mesh: usize,
        /// Primitive index within the mesh.
        primitive: usize,
        /// Attribute semantic, e.g. `POSITION`.
        attribute: &'static str,
    },
    /// The document needs an extension no installed decoder handles.
    DecoderUnavailable(String),
    /// A compressed-mesh decoder failed.
    Decode(String),
}

impl fmt::Display for AssetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { url, reason } => {
                write!(f, "failed to fetch {url}: {reason}")
            }
            Self::Parse(e) => write!(f, "glTF parse error: {e}"),
            Self::MissingBuffer { index } => {
                write!(f, "buffer {index} is missing or truncated")
            }
            Self::InvalidDataUri(msg) => write!(f, "invalid data URI: {msg}"),
            Self::MissingAttribute {
                mesh,
                primitive,
                attribute,
            } => write!(
                f,
                "mesh {mesh} primitive {primitive} has no {attribute} attribute"
            ),
            Self::DecoderUnavailable(ext) => {
                write!(f, "no decoder installed for required extension {ext}")
            }
            Self::Decode(msg) => write!(f, "mesh decode error: {msg}"),
        }
    }
}

impl std::error::Error for AssetLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf::Error> for AssetLoadError {
    fn from(e: gltf::Error) -> Self {
        Self::Parse(e)
    }
}
