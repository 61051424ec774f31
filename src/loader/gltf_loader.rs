//! glTF 2.0 loader producing [`LoadedAsset`] subtrees.
//!
//! Supports `.gltf` documents with embedded (`data:`) or relative buffer
//! URIs and binary `.glb` containers. Documents that require compressed
//! meshes are handed to an installed [`CompressedMeshDecoder`].

use std::rc::Rc;

use base64::Engine as _;
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;
use glam::{Quat, Vec3};
use gltf::Gltf;

use super::{
    AssetLoadError, AssetLoader, AssetRequest, CompressedMeshDecoder, Fetch,
    LoadResult,
};
use crate::scene::{
    AssetNode, LoadedAsset, Material, Mesh, MeshData, Transform,
};

/// Extension name of Draco-compressed primitives.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// [`AssetLoader`] for glTF documents fetched through `F`.
pub struct GltfLoader<F> {
    fetcher: Rc<F>,
    decoder: Option<Rc<dyn CompressedMeshDecoder>>,
}

impl<F> Clone for GltfLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Rc::clone(&self.fetcher),
            decoder: self.decoder.clone(),
        }
    }
}

impl<F: Fetch + 'static> GltfLoader<F> {
    /// Loader without compressed-mesh support.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Rc::new(fetcher),
            decoder: None,
        }
    }

    /// Install a decoder for documents requiring compressed meshes.
    #[must_use]
    pub fn with_decoder(
        mut self,
        decoder: impl CompressedMeshDecoder + 'static,
    ) -> Self {
        self.decoder = Some(Rc::new(decoder));
        self
    }
}

impl<F: Fetch + 'static> AssetLoader for GltfLoader<F> {
    fn load(&self, request: &AssetRequest) -> LocalBoxFuture<'static, LoadResult> {
        let fetcher = Rc::clone(&self.fetcher);
        let decoder = self.decoder.clone();
        let url = request.url.clone();
        let decoder_path = request.decoder_path.clone();
        async move {
            log::debug!("loading {url}");
            let bytes = fetcher.fetch(&url).await?;
            let Gltf { document, blob } = parse_document(&bytes)?;
            let buffers =
                resolve_buffers(&document, blob, &url, fetcher.as_ref()).await?;

            if requires_compressed_meshes(&document) {
                let decoder = decoder.ok_or_else(|| {
                    AssetLoadError::DecoderUnavailable(DRACO_EXTENSION.into())
                })?;
                return decoder.decode(
                    decoder_path.as_deref(),
                    &document,
                    &buffers,
                );
            }

            let asset = convert_document(&document, &buffers, asset_name(&url))?;
            log::debug!("loaded {url}: {} meshes", asset.mesh_count());
            Ok(asset)
        }
        .boxed_local()
    }
}

fn requires_compressed_meshes(document: &gltf::Document) -> bool {
    document.extensions_required().any(|ext| ext == DRACO_EXTENSION)
}

/// Validate the document, falling back to an unvalidated parse only for
/// documents that need the compressed-mesh decoder.
fn parse_document(bytes: &[u8]) -> Result<Gltf, AssetLoadError> {
    let validation_error = match Gltf::from_slice(bytes) {
        Ok(gltf) => return Ok(gltf),
        Err(e) => e,
    };
    match Gltf::from_slice_without_validation(bytes) {
        Ok(raw) if requires_compressed_meshes(&raw) => Ok(raw),
        _ => Err(validation_error.into()),
    }
}

fn asset_name(url: &str) -> Option<String> {
    let file = url.rsplit(['/', '\\']).next()?;
    let stem = file.split(['?', '#']).next()?.split('.').next()?;
    (!stem.is_empty()).then(|| stem.to_owned())
}

/// Resolve `relative` against the document URL `base`.
///
/// Absolute URLs and rooted paths are returned unchanged.
#[must_use]
pub fn resolve_uri(base: &str, relative: &str) -> String {
    if relative.contains("://") || relative.starts_with('/') {
        return relative.to_owned();
    }
    match base.rfind(['/', '\\']) {
        Some(i) => format!("{}{relative}", &base[..=i]),
        None => relative.to_owned(),
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, AssetLoadError> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| {
        AssetLoadError::InvalidDataUri("missing data: prefix".into())
    })?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        AssetLoadError::InvalidDataUri("missing ',' separator".into())
    })?;
    if !header.ends_with(";base64") {
        return Err(AssetLoadError::InvalidDataUri(format!(
            "unsupported encoding '{header}'"
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AssetLoadError::InvalidDataUri(e.to_string()))
}

async fn resolve_buffers<F: Fetch + ?Sized>(
    document: &gltf::Document,
    mut blob: Option<Vec<u8>>,
    base_url: &str,
    fetcher: &F,
) -> Result<Vec<Vec<u8>>, AssetLoadError> {
    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .take()
                .ok_or(AssetLoadError::MissingBuffer {
                    index: buffer.index(),
                })?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                decode_data_uri(uri)?
            }
            gltf::buffer::Source::Uri(uri) => {
                fetcher.fetch(&resolve_uri(base_url, uri)).await?
            }
        };
        if data.len() < buffer.length() {
            return Err(AssetLoadError::MissingBuffer {
                index: buffer.index(),
            });
        }
        buffers.push(data);
    }
    Ok(buffers)
}

fn convert_document(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    name: Option<String>,
) -> Result<LoadedAsset, AssetLoadError> {
    let Some(scene) = document
        .default_scene()
        .or_else(|| document.scenes().next())
    else {
        return Ok(LoadedAsset::from_nodes(name, Vec::new()));
    };
    let nodes = scene
        .nodes()
        .map(|node| convert_node(&node, buffers))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LoadedAsset::from_nodes(name, nodes))
}

fn convert_node(
    node: &gltf::Node<'_>,
    buffers: &[Vec<u8>],
) -> Result<AssetNode, AssetLoadError> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    };
    let mut out = AssetNode::group(node.name().map(str::to_owned), transform);

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping mesh {} primitive {}: {:?} topology",
                    mesh.index(),
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }
            out.children.push(AssetNode::mesh(
                mesh.name().map(str::to_owned),
                convert_primitive(&mesh, &primitive, buffers)?,
            ));
        }
    }
    for child in node.children() {
        out.children.push(convert_node(&child, buffers)?);
    }
    Ok(out)
}

fn convert_primitive(
    mesh: &gltf::Mesh<'_>,
    primitive: &gltf::Primitive<'_>,
    buffers: &[Vec<u8>],
) -> Result<Mesh, AssetLoadError> {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or(AssetLoadError::MissingAttribute {
            mesh: mesh.index(),
            primitive: primitive.index(),
            attribute: "POSITION",
        })?
        .collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(Iterator::collect)
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..u32::try_from(positions.len()).unwrap_or(u32::MAX))
            .collect(),
    };

    let colors: Vec<[f32; 4]> = reader
        .read_colors(0)
        .map(|colors| colors.into_rgba_f32().collect())
        .unwrap_or_default();

    let mut data = MeshData {
        positions,
        normals,
        colors,
        indices,
    };
    data.ensure_normals();

    let pbr = primitive.material().pbr_metallic_roughness();
    if let Some(texture) = pbr.base_color_texture() {
        log::warn!(
            "mesh {} primitive {}: base color texture {} not supported; \
             using the color factor",
            mesh.index(),
            primitive.index(),
            texture.texture().index()
        );
    }
    let material = Material {
        base_color: pbr.base_color_factor(),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
    };
    Ok(Mesh::new(data, material))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::lifecycle::LoadTicket;
    use crate::scene::NodeKind;

    /// In-memory fetcher keyed by URL.
    #[derive(Default)]
    struct MemoryFetcher {
        files: HashMap<String, Vec<u8>>,
        requested: RefCell<Vec<String>>,
    }

    impl Fetch for MemoryFetcher {
        fn fetch(
            &self,
            url: &str,
        ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetLoadError>> {
            self.requested.borrow_mut().push(url.to_owned());
            let result = self.files.get(url).cloned().ok_or_else(|| {
                AssetLoadError::Fetch {
                    url: url.to_owned(),
                    reason: "not found".into(),
                }
            });
            async move { result }.boxed_local()
        }
    }

    /// One triangle in the XZ plane, u16 indices, padded to 44 bytes.
    fn triangle_buffer() -> Vec<u8> {
        let mut bytes = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]] {
            for c in p {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    fn triangle_document(buffer_uri: &str) -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "island", "translation": [0.0, 1.0, 0.0], "children": [1] }},
    {{ "name": "terrain", "mesh": 0 }}
  ],
  "meshes": [{{
    "name": "terrain",
    "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }}]
  }}],
  "materials": [{{
    "pbrMetallicRoughness": {{
      "baseColorFactor": [0.2, 0.6, 0.3, 1.0],
      "metallicFactor": 0.0,
      "roughnessFactor": 0.8
    }}
  }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, -1.0], "max": [1.0, 0.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "buffers": [{{ "byteLength": 44, "uri": "{buffer_uri}" }}]
}}"#
        )
    }

    fn embedded_document() -> Vec<u8> {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(triangle_buffer());
        triangle_document(&format!(
            "data:application/octet-stream;base64,{encoded}"
        ))
        .into_bytes()
    }

    fn request(url: &str) -> AssetRequest {
        AssetRequest {
            ticket: LoadTicket::new(1),
            url: url.into(),
            decoder_path: Some("/draco/".into()),
        }
    }

    fn load(fetcher: MemoryFetcher, url: &str) -> LoadResult {
        pollster::block_on(GltfLoader::new(fetcher).load(&request(url)))
    }

    #[test]
    fn embedded_buffer_loads_expected_subtree() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher
            .files
            .insert("models/RoosIsland.gltf".into(), embedded_document());
        let asset = load(fetcher, "models/RoosIsland.gltf").unwrap();

        assert_eq!(asset.root.name.as_deref(), Some("RoosIsland"));
        assert_eq!(asset.mesh_count(), 1);
        let island = &asset.root.children[0];
        assert_eq!(island.name.as_deref(), Some("island"));
        assert_eq!(island.transform.translation, Vec3::Y);
        let terrain = &island.children[0];
        let NodeKind::Mesh(mesh) = &terrain.children[0].kind else {
            panic!("expected a mesh leaf");
        };
        assert_eq!(mesh.data.positions.len(), 3);
        assert_eq!(mesh.data.indices, vec![0, 1, 2]);
        assert_eq!(mesh.data.normals.len(), 3);
        assert!((Vec3::from_array(mesh.data.normals[0]) - Vec3::Y).length() < 1e-5);
        assert_eq!(mesh.material.roughness, 0.8);
        assert_eq!(mesh.material.metalness, 0.0);
        assert!(!mesh.cast_shadow && !mesh.receive_shadow);
    }

    /// Triangle with per-vertex `COLOR_0` and a textured material whose
    /// image is never fetched.
    fn colored_document() -> Vec<u8> {
        let mut bytes = triangle_buffer();
        for color in [[1.0f32, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 0.5]] {
            for c in color {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0 }}],
  "meshes": [{{
    "primitives": [{{
      "attributes": {{ "POSITION": 0, "COLOR_0": 2 }},
      "indices": 1,
      "material": 0
    }}]
  }}],
  "materials": [{{
    "pbrMetallicRoughness": {{
      "baseColorFactor": [0.5, 0.5, 0.5, 1.0],
      "baseColorTexture": {{ "index": 0 }}
    }}
  }}],
  "textures": [{{ "source": 0 }}],
  "images": [{{ "uri": "grass.png" }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, -1.0], "max": [1.0, 0.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }},
    {{ "buffer": 0, "byteOffset": 44, "byteLength": 48, "target": 34962 }}
  ],
  "buffers": [{{ "byteLength": {len}, "uri": "data:application/octet-stream;base64,{encoded}" }}]
}}"#,
            len = bytes.len()
        )
        .into_bytes()
    }

    #[test]
    fn vertex_colors_are_read_and_textures_fall_back_to_the_factor() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher.files.insert("painted.gltf".into(), colored_document());
        let fetcher = Rc::new(fetcher);
        let loader = GltfLoader {
            fetcher: Rc::clone(&fetcher),
            decoder: None,
        };
        let asset =
            pollster::block_on(loader.load(&request("painted.gltf"))).unwrap();

        let NodeKind::Mesh(mesh) = &asset.root.children[0].children[0].kind else {
            panic!("expected a mesh leaf");
        };
        assert_eq!(
            mesh.data.colors,
            vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 0.5]]
        );
        assert_eq!(mesh.material.base_color, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(*fetcher.requested.borrow(), vec!["painted.gltf".to_owned()]);
    }

    #[test]
    fn primitives_without_colors_leave_them_empty() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher
            .files
            .insert("island.gltf".into(), embedded_document());
        let asset = load(fetcher, "island.gltf").unwrap();
        let NodeKind::Mesh(mesh) = &asset.root.children[0].children[0].children[0].kind
        else {
            panic!("expected a mesh leaf");
        };
        assert!(mesh.data.colors.is_empty());
    }

    #[test]
    fn relative_buffer_is_fetched_next_to_the_document() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher.files.insert(
            "models/island.gltf".into(),
            triangle_document("island.bin").into_bytes(),
        );
        let _ = fetcher
            .files
            .insert("models/island.bin".into(), triangle_buffer());
        let fetcher = Rc::new(fetcher);

        let loader = GltfLoader {
            fetcher: Rc::clone(&fetcher),
            decoder: None,
        };
        let asset =
            pollster::block_on(loader.load(&request("models/island.gltf")))
                .unwrap();
        assert_eq!(asset.mesh_count(), 1);
        assert_eq!(
            *fetcher.requested.borrow(),
            vec!["models/island.gltf".to_owned(), "models/island.bin".to_owned()]
        );
    }

    #[test]
    fn truncated_buffer_is_reported() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher.files.insert(
            "island.gltf".into(),
            triangle_document("island.bin").into_bytes(),
        );
        let _ = fetcher.files.insert("island.bin".into(), vec![0; 8]);
        let err = load(fetcher, "island.gltf").unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingBuffer { index: 0 }));
    }

    #[test]
    fn missing_document_is_a_fetch_error() {
        let err = load(MemoryFetcher::default(), "nowhere.gltf").unwrap_err();
        assert!(matches!(err, AssetLoadError::Fetch { ref url, .. } if url == "nowhere.gltf"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher
            .files
            .insert("bad.gltf".into(), b"{ not gltf".to_vec());
        let err = load(fetcher, "bad.gltf").unwrap_err();
        assert!(matches!(err, AssetLoadError::Parse(_)));
    }

    const COMPRESSED_DOCUMENT: &str = r#"{
  "asset": { "version": "2.0" },
  "extensionsUsed": ["KHR_draco_mesh_compression"],
  "extensionsRequired": ["KHR_draco_mesh_compression"]
}"#;

    #[test]
    fn compressed_meshes_need_a_decoder() {
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher
            .files
            .insert("island.gltf".into(), COMPRESSED_DOCUMENT.into());
        let err = load(fetcher, "island.gltf").unwrap_err();
        assert!(
            matches!(err, AssetLoadError::DecoderUnavailable(ref ext) if ext == DRACO_EXTENSION)
        );
    }

    #[test]
    fn decoder_receives_configured_path() {
        struct Recording(Rc<RefCell<Option<String>>>);
        impl CompressedMeshDecoder for Recording {
            fn decode(
                &self,
                decoder_path: Option<&str>,
                _document: &gltf::Document,
                _buffers: &[Vec<u8>],
            ) -> LoadResult {
                *self.0.borrow_mut() = decoder_path.map(str::to_owned);
                Ok(LoadedAsset::from_nodes(None, Vec::new()))
            }
        }

        let seen = Rc::new(RefCell::new(None));
        let mut fetcher = MemoryFetcher::default();
        let _ = fetcher
            .files
            .insert("island.gltf".into(), COMPRESSED_DOCUMENT.into());
        let loader =
            GltfLoader::new(fetcher).with_decoder(Recording(Rc::clone(&seen)));
        let asset =
            pollster::block_on(loader.load(&request("island.gltf"))).unwrap();
        assert_eq!(asset.mesh_count(), 0);
        assert_eq!(seen.borrow().as_deref(), Some("/draco/"));
    }

    #[test]
    fn data_uri_must_be_base64() {
        assert!(decode_data_uri("data:application/octet-stream;base64,AQID")
            .is_ok_and(|d| d == vec![1, 2, 3]));
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(AssetLoadError::InvalidDataUri(_))
        ));
    }

    #[test]
    fn uris_resolve_against_the_document() {
        assert_eq!(resolve_uri("a/b/scene.gltf", "scene.bin"), "a/b/scene.bin");
        assert_eq!(resolve_uri("scene.gltf", "scene.bin"), "scene.bin");
        assert_eq!(
            resolve_uri("https://x.org/m/s.gltf", "https://cdn.org/s.bin"),
            "https://cdn.org/s.bin"
        );
        assert_eq!(asset_name("https://x.org/m/RoosIsland.gltf?v=2").as_deref(), Some("RoosIsland"));
    }
}
