//! Scene graph: an append-only arena of group, mesh and helper nodes.
//!
//! The graph is owned by exactly one scene controller. Every structural or
//! mesh-state change bumps a generation counter so the renderer can tell
//! when its GPU copies are stale.

mod asset;
mod light;
mod node;

pub use asset::{AssetNode, LoadedAsset};
use glam::{Mat4, Vec3};
pub use light::{
    srgb_to_linear, AmbientLight, DirectionalLight, LightRig, ShadowCamera,
};
pub use node::{
    Helper, Material, Mesh, MeshData, Node, NodeId, NodeKind, Transform,
};

use crate::options::{DebugOptions, MaterialOverride};

// ---------------------------------------------------------------------------
// SceneGraph
// ---------------------------------------------------------------------------

/// Tree of visual nodes rooted at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: Some("root".into()),
                transform: Transform::IDENTITY,
                kind: NodeKind::Group,
                parent: None,
                children: Vec::new(),
            }],
            generation: 0,
            rendered_generation: 0,
        }
    }

    // -- Mutation helpers --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the graph changed since last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Mark the current generation as uploaded.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    // -- Structure --

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Read access to a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Append a node under `parent`. Returns `None` if `parent` does not
    /// exist.
    pub fn add(
        &mut self,
        parent: NodeId,
        name: Option<String>,
        transform: Transform,
        kind: NodeKind,
    ) -> Option<NodeId> {
        let id = NodeId(u32::try_from(self.nodes.len()).ok()?);
        self.nodes.get_mut(parent.index())?.children.push(id);
        self.nodes.push(Node {
            name,
            transform,
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.invalidate();
        Some(id)
    }

    /// Insert a decoded asset under `parent` with `transform` applied to
    /// the asset's root. Returns the id of the attached root.
    pub fn attach_asset(
        &mut self,
        parent: NodeId,
        asset: LoadedAsset,
        transform: Transform,
    ) -> Option<NodeId> {
        let LoadedAsset { mut root } = asset;
        root.transform = Transform::from_matrix(
            transform.matrix() * root.transform.matrix(),
        );
        self.attach_node(parent, root)
    }

    fn attach_node(
        &mut self,
        parent: NodeId,
        node: AssetNode,
    ) -> Option<NodeId> {
        let AssetNode {
            name,
            transform,
            kind,
            children,
        } = node;
        let id = self.add(parent, name, transform, kind)?;
        for child in children {
            let _ = self.attach_node(id, child)?;
        }
        Some(id)
    }

    /// `id` followed by all of its descendants, depth-first.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(id).is_none() {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Mesh nodes in the subtree rooted at `id`.
    #[must_use]
    pub fn meshes_in(&self, id: NodeId) -> Vec<NodeId> {
        self.subtree(id)
            .into_iter()
            .filter(|n| self.node(*n).is_some_and(|n| n.mesh().is_some()))
            .collect()
    }

    /// Set shadow participation on every mesh of a subtree. Returns the
    /// number of meshes touched.
    pub fn set_shadows(
        &mut self,
        id: NodeId,
        cast: bool,
        receive: bool,
    ) -> usize {
        let meshes = self.meshes_in(id);
        for n in &meshes {
            if let Some(NodeKind::Mesh(mesh)) =
                self.nodes.get_mut(n.index()).map(|n| &mut n.kind)
            {
                mesh.cast_shadow = cast;
                mesh.receive_shadow = receive;
            }
        }
        if !meshes.is_empty() {
            self.invalidate();
        }
        meshes.len()
    }

    /// Apply a material override to every mesh of a subtree. Returns the
    /// number of meshes touched.
    pub fn apply_material_override(
        &mut self,
        id: NodeId,
        material_override: MaterialOverride,
    ) -> usize {
        if material_override == MaterialOverride::None {
            return 0;
        }
        let meshes = self.meshes_in(id);
        for n in &meshes {
            if let Some(NodeKind::Mesh(mesh)) =
                self.nodes.get_mut(n.index()).map(|n| &mut n.kind)
            {
                mesh.material.apply_override(material_override);
            }
        }
        if !meshes.is_empty() {
            self.invalidate();
        }
        meshes.len()
    }

    /// Add the debug helpers enabled in `debug` under the root.
    pub fn add_debug_helpers(&mut self, debug: &DebugOptions, lights: &LightRig) {
        if debug.show_axes {
            let _ = self.add(
                NodeId::ROOT,
                Some("axes".into()),
                Transform::IDENTITY,
                NodeKind::Helper(Helper::Axes {
                    size: debug.axes_size,
                }),
            );
        }
        if debug.show_light_helper {
            let sun = &lights.directional;
            let _ = self.add(
                NodeId::ROOT,
                Some("sun helper".into()),
                Transform::IDENTITY,
                NodeKind::Helper(Helper::DirectionalLight {
                    size: debug.light_helper_size,
                    position: sun.position,
                    target: sun.target,
                    color: sun.color.to_array(),
                }),
            );
        }
    }

    // -- Transforms --

    /// Local-to-world matrix of a node.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    /// World-space translation of a node.
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.w_axis.truncate())
    }

    /// Every node with its world matrix, parents before children.
    #[must_use]
    pub fn world_matrices(&self) -> Vec<Mat4> {
        // Parents always precede children in the arena.
        let mut out: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = node.transform.matrix();
            let world = node
                .parent
                .and_then(|p| out.get(p.index()))
                .map_or(local, |parent| *parent * local);
            out.push(world);
        }
        out
    }
}
