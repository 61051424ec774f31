//! Decoded asset subtrees, detached from any [`SceneGraph`](super::SceneGraph)
//! until the load completes.

use super::node::{Mesh, NodeKind, Transform};

/// One node of a decoded asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetNode {
    /// Name from the source document, if any.
    pub name: Option<String>,
    /// Transform relative to the parent node.
    pub transform: Transform,
    /// Payload (groups for transform nodes, meshes for primitives).
    pub kind: NodeKind,
    /// Child nodes.
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    /// A named group with no children yet.
    #[must_use]
    pub fn group(name: Option<String>, transform: Transform) -> Self {
        Self {
            name,
            transform,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    /// A mesh leaf at the parent's origin.
    #[must_use]
    pub fn mesh(name: Option<String>, mesh: Mesh) -> Self {
        Self {
            name,
            transform: Transform::IDENTITY,
            kind: NodeKind::Mesh(mesh),
            children: Vec::new(),
        }
    }

    fn mesh_count(&self) -> usize {
        usize::from(matches!(self.kind, NodeKind::Mesh(_)))
            + self.children.iter().map(Self::mesh_count).sum::<usize>()
    }
}

/// A fully decoded asset, ready to be attached to the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAsset {
    /// Root of the decoded subtree.
    pub root: AssetNode,
}

impl LoadedAsset {
    /// Wrap a list of top-level nodes under one unnamed group.
    #[must_use]
    pub fn from_nodes(name: Option<String>, nodes: Vec<AssetNode>) -> Self {
        let mut root = AssetNode::group(name, Transform::IDENTITY);
        root.children = nodes;
        Self { root }
    }

    /// Number of mesh nodes in the subtree.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }
}
