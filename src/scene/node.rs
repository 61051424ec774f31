use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::options::MaterialOverride;

/// Handle to a node in a [`SceneGraph`](super::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The root group every graph starts with.
    pub const ROOT: Self = Self(0);

    /// Arena index of this node.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local translation / rotation / scale of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub translation: Vec3,
    /// Rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, rotation or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Translation plus uniform scale.
    #[must_use]
    pub fn placed(translation: Vec3, scale: f32) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(scale),
        }
    }

    /// Decompose an affine matrix.
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) =
            matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

/// Vertex and index data of a single triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions in mesh space.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals (same length as `positions`).
    pub normals: Vec<[f32; 3]>,
    /// Linear RGBA vertex colors multiplied into the base color. Empty
    /// means white.
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices into `positions`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fill `normals` with area-weighted face normals when the source
    /// provided none.
    pub fn ensure_normals(&mut self) {
        if self.normals.len() == self.positions.len() {
            return;
        }
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len()
            {
                continue;
            }
            let pa = Vec3::from_array(self.positions[a]);
            let pb = Vec3::from_array(self.positions[b]);
            let pc = Vec3::from_array(self.positions[c]);
            let n = (pb - pa).cross(pc - pa);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.normalize_or(Vec3::Y).to_array())
            .collect();
    }
}

/// Metallic-roughness surface description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

impl Material {
    /// Apply an override, clamping the replacement value into `[0, 1]`.
    pub fn apply_override(&mut self, material_override: MaterialOverride) {
        match material_override {
            MaterialOverride::None => {}
            MaterialOverride::Roughness(v) => {
                self.roughness = clamp_unit(v);
            }
            MaterialOverride::Metalness(v) => {
                self.metalness = clamp_unit(v);
            }
        }
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// A drawable triangle mesh with its material and shadow participation.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Shared geometry.
    pub data: Arc<MeshData>,
    /// Surface material.
    pub material: Material,
    /// Rendered into the shadow map.
    pub cast_shadow: bool,
    /// Samples the shadow map when shaded.
    pub receive_shadow: bool,
}

impl Mesh {
    /// A mesh that neither casts nor receives shadows.
    #[must_use]
    pub fn new(data: MeshData, material: Material) -> Self {
        Self {
            data: Arc::new(data),
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// Debug line geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Helper {
    /// RGB axes from the node origin.
    Axes {
        /// Length of each axis.
        size: f32,
    },
    /// Square gizmo at a directional light with a line toward its target.
    DirectionalLight {
        /// Half-extent of the square.
        size: f32,
        /// Light position in world space.
        position: Vec3,
        /// Point the light aims at.
        target: Vec3,
        /// Line color.
        color: [f32; 3],
    },
}

impl Helper {
    /// Line segments as `(start, end, color)` in node space.
    #[must_use]
    pub fn segments(&self) -> Vec<(Vec3, Vec3, [f32; 3])> {
        match *self {
            Self::Axes { size } => vec![
                (Vec3::ZERO, Vec3::X * size, [1.0, 0.0, 0.0]),
                (Vec3::ZERO, Vec3::Y * size, [0.0, 1.0, 0.0]),
                (Vec3::ZERO, Vec3::Z * size, [0.0, 0.0, 1.0]),
            ],
            Self::DirectionalLight {
                size,
                position,
                target,
                color,
            } => {
                let dir = (target - position).normalize_or(Vec3::NEG_Y);
                let side = if dir.cross(Vec3::Y).length_squared() < 1e-6 {
                    Vec3::X
                } else {
                    dir.cross(Vec3::Y).normalize()
                };
                let up = side.cross(dir);
                let corners = [
                    position + (side + up) * size,
                    position + (up - side) * size,
                    position - (side + up) * size,
                    position + (side - up) * size,
                ];
                let mut lines: Vec<_> = (0..4)
                    .map(|i| (corners[i], corners[(i + 1) % 4], color))
                    .collect();
                lines.push((position, target, color));
                lines
            }
        }
    }
}

/// What a node contributes to the rendered image.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform node.
    Group,
    /// Triangle mesh.
    Mesh(Mesh),
    /// Debug line geometry.
    Helper(Helper),
}

/// One entry of the scene arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Optional display name.
    pub name: Option<String>,
    /// Transform relative to the parent.
    pub transform: Transform,
    /// Node payload.
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Parent node (`None` for the root).
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The mesh payload, if this is a mesh node.
    #[must_use]
    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_clamped_into_unit_range() {
        let mut m = Material::default();
        m.apply_override(MaterialOverride::Roughness(-0.5));
        assert_eq!(m.roughness, 0.0);
        m.apply_override(MaterialOverride::Metalness(1.7));
        assert_eq!(m.metalness, 1.0);
        m.apply_override(MaterialOverride::Roughness(f32::NAN));
        assert_eq!(m.roughness, 0.0);
        m.apply_override(MaterialOverride::None);
        assert_eq!(m.metalness, 1.0);
    }

    #[test]
    fn missing_normals_are_generated() {
        let mut data = MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
            ..MeshData::default()
        };
        data.ensure_normals();
        assert_eq!(data.normals.len(), 3);
        for n in &data.normals {
            assert!((Vec3::from_array(*n) - Vec3::Y).length() < 1e-5);
        }
    }

    #[test]
    fn transform_round_trips_through_matrix() {
        let t = Transform::placed(Vec3::new(-5.0, 0.0, 0.0), 0.9);
        let back = Transform::from_matrix(t.matrix());
        assert!((back.translation - t.translation).length() < 1e-5);
        assert!((back.scale - t.scale).length() < 1e-5);
    }

    #[test]
    fn light_helper_draws_square_and_direction() {
        let helper = Helper::DirectionalLight {
            size: 12.0,
            position: Vec3::new(30.0, 60.0, -30.0),
            target: Vec3::ZERO,
            color: [1.0, 1.0, 1.0],
        };
        let segments = helper.segments();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[4].1, Vec3::ZERO);
        assert_eq!(Helper::Axes { size: 50.0 }.segments().len(), 3);
    }
}
