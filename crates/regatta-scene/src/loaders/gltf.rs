use crate::graph::animation::{Animation, KeyFrame, NodeChannels};
use crate::graph::{Model, Node, Skin};
use crate::mesh::{AttributeBuffer, BufferData, ComponentType, IndexBuffer, Mesh};
use crate::{ObjectLoader, SceneError};
use regatta_math::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The subset of the glTF 2.0 JSON schema the decoder consumes. Unknown
/// fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<BufferSlot>,
    #[serde(default)]
    pub meshes: Vec<MeshEntry>,
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,
    pub scene: Option<usize>,
    #[serde(default)]
    pub skins: Vec<SkinEntry>,
    #[serde(default)]
    pub animations: Vec<AnimationEntry>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: usize,
    pub component_type: u32,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub count: usize,
    #[serde(default)]
    pub byte_offset: usize,
}

/// Accessor element shapes and their arity in scalar components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ElementKind {
    #[serde(rename = "SCALAR")]
    Scalar,
    #[serde(rename = "VEC2")]
    Vec2,
    #[serde(rename = "VEC3")]
    Vec3,
    #[serde(rename = "VEC4")]
    Vec4,
    #[serde(rename = "MAT2")]
    Mat2,
    #[serde(rename = "MAT3")]
    Mat3,
    #[serde(rename = "MAT4")]
    Mat4,
}

impl ElementKind {
    pub fn size(self) -> usize {
        match self {
            ElementKind::Scalar => 1,
            ElementKind::Vec2 => 2,
            ElementKind::Vec3 => 3,
            ElementKind::Vec4 | ElementKind::Mat2 => 4,
            ElementKind::Mat3 => 9,
            ElementKind::Mat4 => 16,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct BufferSlot {
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MeshEntry {
    #[serde(default)]
    pub primitives: Vec<Primitive>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Primitive {
    #[serde(default)]
    pub attributes: HashMap<String, usize>,
    pub indices: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NodeEntry {
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<usize>,
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SceneEntry {
    #[serde(default)]
    pub nodes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinEntry {
    #[serde(default)]
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnimationEntry {
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
    #[serde(default)]
    pub samplers: Vec<SamplerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelEntry {
    pub sampler: usize,
    pub target: TargetEntry,
}

#[derive(Debug, Deserialize)]
pub struct TargetEntry {
    pub node: Option<usize>,
    pub path: TargetPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct SamplerEntry {
    pub input: usize,
    pub output: usize,
    pub interpolation: Option<Interpolation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

/// Reads an accessor's `count * arity` little-endian elements from its
/// backing buffer, starting at the view offset plus the accessor offset.
pub fn extract_accessor(
    document: &Document,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<AttributeBuffer, SceneError> {
    let accessor = document
        .accessors
        .get(index)
        .ok_or(SceneError::InvalidIndex { kind: "accessor", index })?;
    let view = document
        .buffer_views
        .get(accessor.buffer_view)
        .ok_or(SceneError::InvalidIndex {
            kind: "bufferView",
            index: accessor.buffer_view,
        })?;
    let buffer = buffers.get(view.buffer).ok_or(SceneError::InvalidIndex {
        kind: "buffer",
        index: view.buffer,
    })?;

    let component = ComponentType::from_code(accessor.component_type)?;
    let size = accessor.kind.size();
    let offset = view.byte_offset.saturating_add(accessor.byte_offset);
    let need = accessor
        .count
        .saturating_mul(size)
        .saturating_mul(component.byte_size());
    let end = offset.saturating_add(need);

    let bytes = buffer
        .get(offset..end)
        .ok_or(SceneError::AccessorOutOfBounds {
            accessor: index,
            buffer: view.buffer,
            need: end,
            len: buffer.len(),
        })?;

    let data = match component {
        ComponentType::UnsignedByte => BufferData::U8(bytes.to_vec()),
        ComponentType::UnsignedShort => BufferData::U16(
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        ),
        ComponentType::UnsignedInt => BufferData::U32(
            bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        ComponentType::Float => BufferData::F32(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
    };

    Ok(AttributeBuffer {
        data,
        size,
        count: accessor.count,
        component,
    })
}

fn extract_attribute(
    document: &Document,
    buffers: &[Vec<u8>],
    primitive: &Primitive,
    name: &str,
) -> Result<Option<AttributeBuffer>, SceneError> {
    match primitive.attributes.get(name) {
        Some(&accessor) => Ok(Some(extract_accessor(document, buffers, accessor)?)),
        None => Ok(None),
    }
}

fn load_mesh(
    document: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    entry: &MeshEntry,
) -> Result<Mesh, SceneError> {
    if entry.primitives.len() > 1 {
        log::warn!(
            "mesh {} has {} primitives, only the first is decoded",
            index,
            entry.primitives.len()
        );
    }
    let primitive = entry
        .primitives
        .first()
        .ok_or(SceneError::MissingPositions(index))?;

    let indices = match primitive.indices {
        Some(accessor) => {
            let buffer = extract_accessor(document, buffers, accessor)?;
            Some(IndexBuffer {
                count: buffer.data.len(),
                data: buffer.data,
            })
        }
        None => None,
    };

    Ok(Mesh {
        indices,
        positions: extract_attribute(document, buffers, primitive, "POSITION")?
            .ok_or(SceneError::MissingPositions(index))?,
        normals: extract_attribute(document, buffers, primitive, "NORMAL")?,
        tangents: extract_attribute(document, buffers, primitive, "TANGENT")?,
        tex_coords: extract_attribute(document, buffers, primitive, "TEXCOORD_0")?,
        joints: extract_attribute(document, buffers, primitive, "JOINTS_0")?,
        weights: extract_attribute(document, buffers, primitive, "WEIGHTS_0")?,
    })
}

fn load_node(index: usize, entry: &NodeEntry) -> Node {
    let local_bind_transform = match entry.matrix {
        Some(elements) => Mat4::from_cols_array(&elements),
        None => {
            let translation = entry.translation.map(Vec3::from).unwrap_or(Vec3::ZERO);
            let rotation = entry.rotation.map(Quat::from_array).unwrap_or(Quat::IDENTITY);
            let scale = entry.scale.map(Vec3::from).unwrap_or(Vec3::ONE);
            compose_trs(translation, rotation, scale)
        }
    };

    Node {
        id: index,
        name: entry.name.clone().unwrap_or_default(),
        children: entry.children.clone(),
        local_bind_transform,
        animated_transform: None,
        mesh: entry.mesh,
        skin: entry.skin,
    }
}

fn load_animation(
    document: &Document,
    buffers: &[Vec<u8>],
    entry: &AnimationEntry,
) -> Result<Animation, SceneError> {
    let mut channels: HashMap<usize, NodeChannels> = HashMap::new();

    for channel in &entry.channels {
        let node = match channel.target.node {
            Some(node) => node,
            None => continue,
        };
        if channel.target.path == TargetPath::Unsupported {
            log::debug!("skipping animation channel with unsupported target path");
            continue;
        }
        let sampler =
            entry
                .samplers
                .get(channel.sampler)
                .ok_or(SceneError::InvalidIndex {
                    kind: "animation sampler",
                    index: channel.sampler,
                })?;

        let times = extract_accessor(document, buffers, sampler.input)?.data.to_f32();
        let output = extract_accessor(document, buffers, sampler.output)?;
        let values = output.data.to_f32();

        // Cubic-spline outputs store in-tangent, value and out-tangent per
        // keyframe; only the middle value element is kept.
        let cubic = sampler.interpolation == Some(Interpolation::CubicSpline);
        let stride = if cubic { output.size * 3 } else { output.size };
        let offset = if cubic { output.size } else { 0 };

        let bundle = channels.entry(node).or_default();
        for (i, &time) in times.iter().enumerate() {
            let base = i * stride + offset;
            if base + output.size > values.len() {
                break;
            }
            match channel.target.path {
                TargetPath::Translation => bundle.translation.push(KeyFrame {
                    time,
                    value: Vec3::new(values[base], values[base + 1], values[base + 2]),
                }),
                TargetPath::Rotation => bundle.rotation.push(KeyFrame {
                    time,
                    value: Quat::from_xyzw(
                        values[base],
                        values[base + 1],
                        values[base + 2],
                        values[base + 3],
                    ),
                }),
                TargetPath::Scale => bundle.scale.push(KeyFrame {
                    time,
                    value: Vec3::new(values[base], values[base + 1], values[base + 2]),
                }),
                TargetPath::Unsupported => {}
            }
        }
    }

    channels.retain(|_, bundle| !bundle.is_empty());
    Ok(Animation { channels })
}

fn load_skin(
    document: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    entry: &SkinEntry,
) -> Result<Skin, SceneError> {
    let inverse_bind_transforms: Vec<Mat4> = match entry.inverse_bind_matrices {
        Some(accessor) => extract_accessor(document, buffers, accessor)?
            .data
            .to_f32()
            .chunks_exact(16)
            .take(entry.joints.len())
            .map(|chunk| {
                let mut elements = [0.0f32; 16];
                elements.copy_from_slice(chunk);
                Mat4::from_cols_array(&elements)
            })
            .collect(),
        None => Vec::new(),
    };

    if inverse_bind_transforms.len() < entry.joints.len() {
        log::warn!(
            "skin {} has {} inverse bind matrices for {} joints; unmatched joints keep their world transform",
            index,
            inverse_bind_transforms.len(),
            entry.joints.len()
        );
    }

    Ok(Skin {
        joints: entry.joints.clone(),
        inverse_bind_transforms,
    })
}

/// Decodes a parsed glTF document and its resolved binary buffers into a
/// [`Model`]. Pure: all fetching has already happened by the time this
/// runs.
pub fn load_model(
    name: &str,
    document: &Document,
    buffers: &[Vec<u8>],
) -> Result<Model, SceneError> {
    let scene_index = document.scene.unwrap_or(0);
    let scene = document.scenes.get(scene_index).ok_or(SceneError::NoScene)?;
    let root_node = *scene.nodes.first().ok_or(SceneError::NoScene)?;

    let meshes = document
        .meshes
        .iter()
        .enumerate()
        .map(|(i, entry)| load_mesh(document, buffers, i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let nodes: Vec<Node> = document
        .nodes
        .iter()
        .enumerate()
        .map(|(i, entry)| load_node(i, entry))
        .collect();

    let mut animations = HashMap::new();
    for (i, entry) in document.animations.iter().enumerate() {
        let name = entry
            .name
            .clone()
            .unwrap_or_else(|| format!("animation-{}", i));
        animations.insert(name, load_animation(document, buffers, entry)?);
    }

    let skins = document
        .skins
        .iter()
        .enumerate()
        .map(|(i, entry)| load_skin(document, buffers, i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let model = Model {
        name: name.to_string(),
        meshes,
        nodes,
        root_node,
        animations,
        skins,
    };
    model.validate_graph()?;
    Ok(model)
}

/// Loads `.gltf` assets together with the external buffer files they
/// reference by relative URI.
#[derive(Debug, Default, Copy, Clone)]
pub struct GltfLoader {}

impl std::fmt::Display for GltfLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gltf-loader")
    }
}

impl ObjectLoader for GltfLoader {
    fn load(&self, path: PathBuf) -> Result<Model, SceneError> {
        let json =
            std::fs::read_to_string(&path).map_err(|e| SceneError::Io(path.clone(), e))?;
        let document = Document::from_json(&json)?;

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut buffers = Vec::with_capacity(document.buffers.len());
        for slot in &document.buffers {
            match &slot.uri {
                Some(uri) => {
                    let buffer_path = directory.join(uri);
                    let bytes = std::fs::read(&buffer_path)
                        .map_err(|e| SceneError::Io(buffer_path.clone(), e))?;
                    buffers.push(bytes);
                }
                // Embedded buffers are not fetched here; an empty slot keeps
                // the buffer indices aligned.
                None => buffers.push(Vec::new()),
            }
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("model")
            .to_string();
        load_model(&name, &document, &buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::animation::sample;
    use serde_json::json;

    const EPS: f32 = 1e-5;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
    }

    fn u16_bytes(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
    }

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_typed_accessor_payloads() {
        let doc = document(json!({
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "VEC3", "count": 2 },
                { "bufferView": 1, "componentType": 5123, "type": "SCALAR", "count": 3 }
            ],
            "bufferViews": [
                { "buffer": 0 },
                { "buffer": 1 }
            ]
        }));
        let buffers = vec![
            f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            u16_bytes(&[0, 1, 2]),
        ];

        let positions = extract_accessor(&doc, &buffers, 0).unwrap();
        assert_eq!(positions.size, 3);
        assert_eq!(positions.count, 2);
        assert_eq!(positions.component, ComponentType::Float);
        assert_eq!(
            positions.data,
            BufferData::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        );

        let indices = extract_accessor(&doc, &buffers, 1).unwrap();
        assert_eq!(indices.data, BufferData::U16(vec![0, 1, 2]));
    }

    #[test]
    fn honors_view_and_accessor_byte_offsets() {
        let doc = document(json!({
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "SCALAR", "count": 2, "byteOffset": 4 }
            ],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 8 }
            ]
        }));
        // Elements 3 and 4: skip 8 bytes of view offset + 4 of accessor offset.
        let buffers = vec![f32_bytes(&[0.0, 1.0, 2.0, 3.0, 4.0])];

        let scalars = extract_accessor(&doc, &buffers, 0).unwrap();
        assert_eq!(scalars.data, BufferData::F32(vec![3.0, 4.0]));
    }

    #[test]
    fn rejects_unknown_component_types() {
        let doc = document(json!({
            "accessors": [
                { "bufferView": 0, "componentType": 5122, "type": "SCALAR", "count": 1 }
            ],
            "bufferViews": [ { "buffer": 0 } ]
        }));
        let buffers = vec![vec![0u8; 4]];

        match extract_accessor(&doc, &buffers, 0) {
            Err(SceneError::UnsupportedComponentType(5122)) => {}
            other => panic!("expected unsupported component type, got {:?}", other),
        }
    }

    #[test]
    fn rejects_accessors_past_the_buffer_end() {
        let doc = document(json!({
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "VEC3", "count": 4 }
            ],
            "bufferViews": [ { "buffer": 0 } ]
        }));
        let buffers = vec![f32_bytes(&[0.0; 3])];

        match extract_accessor(&doc, &buffers, 0) {
            Err(SceneError::AccessorOutOfBounds { .. }) => {}
            other => panic!("expected out of bounds error, got {:?}", other),
        }
    }

    fn triangle_document() -> (Document, Vec<Vec<u8>>) {
        let positions = f32_bytes(&[
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ]);
        let indices = u16_bytes(&[0, 1, 2]);
        let index_offset = positions.len();

        let mut buffer = positions;
        buffer.extend_from_slice(&indices);

        let doc = document(json!({
            "scene": 0,
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "name": "triangle", "mesh": 0 } ],
            "meshes": [
                {
                    "primitives": [
                        { "attributes": { "POSITION": 0 }, "indices": 1 }
                    ]
                }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "VEC3", "count": 3 },
                { "bufferView": 1, "componentType": 5123, "type": "SCALAR", "count": 3 }
            ],
            "bufferViews": [
                { "buffer": 0 },
                { "buffer": 0, "byteOffset": index_offset }
            ],
            "buffers": [ {} ]
        }));

        (doc, vec![buffer])
    }

    #[test]
    fn decodes_a_minimal_indexed_mesh() {
        let (doc, buffers) = triangle_document();
        let model = load_model("triangle.gltf", &doc, &buffers).unwrap();

        assert_eq!(model.name, "triangle.gltf");
        assert_eq!(model.root_node, 0);
        assert_eq!(model.meshes.len(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.positions.count, 3);
        assert_eq!(mesh.positions.size, 3);
        assert!(mesh.normals.is_none());
        assert!(mesh.joints.is_none());

        let indices = mesh.indices.as_ref().unwrap();
        assert_eq!(indices.count, 3);
        assert_eq!(indices.data.to_u32(), vec![0, 1, 2]);
    }

    #[test]
    fn meshes_without_positions_are_fatal() {
        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "mesh": 0 } ],
            "meshes": [
                { "primitives": [ { "attributes": {} } ] }
            ]
        }));

        match load_model("broken.gltf", &doc, &[]) {
            Err(SceneError::MissingPositions(0)) => {}
            other => panic!("expected missing positions, got {:?}", other),
        }
    }

    #[test]
    fn node_matrix_is_used_verbatim() {
        let matrix = Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0));
        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "matrix": matrix.to_cols_array().to_vec() } ]
        }));

        let model = load_model("m.gltf", &doc, &[]).unwrap();
        let p = model.nodes[0]
            .local_bind_transform
            .transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(3.0, 4.0, 5.0)).length() < EPS);
    }

    #[test]
    fn trs_nodes_compose_scale_then_rotation_then_translation() {
        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [
                {
                    "translation": [1.0, 0.0, 0.0],
                    "rotation": [0.0, 0.0, 0.0, 1.0],
                    "scale": [2.0, 2.0, 2.0]
                }
            ]
        }));

        let model = load_model("trs.gltf", &doc, &[]).unwrap();
        let p = model.nodes[0]
            .local_bind_transform
            .transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < EPS);
    }

    fn animated_joint_document(interpolation: &str, output: &[f32]) -> (Document, Vec<Vec<u8>>) {
        let times = f32_bytes(&[0.0, 1.0]);
        let values_offset = times.len();
        let mut buffer = times;
        buffer.extend_from_slice(&f32_bytes(output));

        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "name": "joint" } ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "SCALAR", "count": 2 },
                { "bufferView": 1, "componentType": 5126, "type": "VEC3", "count": 2 }
            ],
            "bufferViews": [
                { "buffer": 0 },
                { "buffer": 0, "byteOffset": values_offset }
            ],
            "buffers": [ {} ],
            "animations": [
                {
                    "name": "slide",
                    "channels": [
                        { "sampler": 0, "target": { "node": 0, "path": "translation" } }
                    ],
                    "samplers": [
                        { "input": 0, "output": 1, "interpolation": interpolation }
                    ]
                }
            ]
        }));

        (doc, vec![buffer])
    }

    #[test]
    fn animation_keyframes_merge_times_and_values() {
        let (doc, buffers) =
            animated_joint_document("LINEAR", &[0.0, 0.0, 0.0, 10.0, 0.0, 0.0]);
        let model = load_model("anim.gltf", &doc, &buffers).unwrap();

        let clip = &model.animations["slide"];
        let channel = &clip.channels[&0].translation;
        assert_eq!(channel.len(), 2);
        assert!((channel[1].time - 1.0).abs() < EPS);

        // 500 ms into a one second track lands exactly between the frames.
        let value = sample(channel, 500.0).unwrap();
        assert!((value - Vec3::new(5.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn cubic_spline_outputs_keep_only_the_value_element() {
        // Per keyframe: in-tangent, value, out-tangent.
        let output = [
            9.0, 9.0, 9.0, /* in */
            0.0, 0.0, 0.0, /* value */
            9.0, 9.0, 9.0, /* out */
            9.0, 9.0, 9.0, /* in */
            10.0, 0.0, 0.0, /* value */
            9.0, 9.0, 9.0, /* out */
        ];
        let (mut doc, buffers) = animated_joint_document("CUBICSPLINE", &output);
        // The output accessor covers all 6 vec3 elements.
        doc.accessors[1].count = 6;

        let model = load_model("spline.gltf", &doc, &buffers).unwrap();
        let channel = &model.animations["slide"].channels[&0].translation;
        assert_eq!(channel.len(), 2);
        assert!((channel[0].value - Vec3::ZERO).length() < EPS);
        assert!((channel[1].value - Vec3::new(10.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn morph_weight_channels_are_ignored() {
        let (mut doc, buffers) =
            animated_joint_document("LINEAR", &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        doc.animations[0].channels[0].target.path = TargetPath::Unsupported;

        let model = load_model("weights.gltf", &doc, &buffers).unwrap();
        assert!(model.animations["slide"].channels.is_empty());
    }

    #[test]
    fn skins_slice_inverse_bind_matrices_per_joint() {
        let ibm_a = Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0));
        let ibm_b = Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0));
        let mut floats = ibm_a.to_cols_array().to_vec();
        floats.extend_from_slice(&ibm_b.to_cols_array());

        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [
                { "children": [1] },
                {}
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "MAT4", "count": 2 }
            ],
            "bufferViews": [ { "buffer": 0 } ],
            "buffers": [ {} ],
            "skins": [
                { "joints": [0, 1], "inverseBindMatrices": 0 }
            ]
        }));
        let buffers = vec![f32_bytes(&floats)];

        let model = load_model("skin.gltf", &doc, &buffers).unwrap();
        let skin = &model.skins[0];
        assert_eq!(skin.joints, vec![0, 1]);
        assert_eq!(skin.inverse_bind_transforms.len(), 2);
        assert!(
            (skin.inverse_bind_transforms[1].transform_point3(Vec3::ZERO)
                - Vec3::new(0.0, -2.0, 0.0))
            .length()
                < EPS
        );
    }

    #[test]
    fn decoded_models_animate_end_to_end() {
        let times = f32_bytes(&[0.0, 1.0]);
        let values = f32_bytes(&[0.0, 0.0, 0.0, 10.0, 0.0, 0.0]);
        let ibm = f32_bytes(&Mat4::IDENTITY.to_cols_array());

        let values_offset = times.len();
        let ibm_offset = values_offset + values.len();
        let mut buffer = times;
        buffer.extend_from_slice(&values);
        buffer.extend_from_slice(&ibm);

        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "name": "joint", "skin": 0 } ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "type": "SCALAR", "count": 2 },
                { "bufferView": 1, "componentType": 5126, "type": "VEC3", "count": 2 },
                { "bufferView": 2, "componentType": 5126, "type": "MAT4", "count": 1 }
            ],
            "bufferViews": [
                { "buffer": 0 },
                { "buffer": 0, "byteOffset": values_offset },
                { "buffer": 0, "byteOffset": ibm_offset }
            ],
            "buffers": [ {} ],
            "skins": [ { "joints": [0], "inverseBindMatrices": 2 } ],
            "animations": [
                {
                    "name": "slide",
                    "channels": [
                        { "sampler": 0, "target": { "node": 0, "path": "translation" } }
                    ],
                    "samplers": [ { "input": 0, "output": 1 } ]
                }
            ]
        }));

        let mut model = load_model("rig.gltf", &doc, &[buffer]).unwrap();

        let mut state = crate::graph::animation::AnimationState::new(0.0);
        state.play("locomotion", "slide");
        state.advance(500.0);
        model.update_pose(&state);

        let applied = model.skin_transforms(&model.skins[0], true);
        let origin = applied[0].transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(5.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn cyclic_node_graphs_fail_to_load() {
        let doc = document(json!({
            "scenes": [ { "nodes": [0] } ],
            "nodes": [
                { "children": [1] },
                { "children": [0] }
            ]
        }));

        match load_model("cycle.gltf", &doc, &[]) {
            Err(SceneError::MalformedSceneGraph(_)) => {}
            other => panic!("expected malformed scene graph, got {:?}", other),
        }
    }

    #[test]
    fn documents_without_scenes_fail_to_load() {
        let doc = document(json!({ "nodes": [ {} ] }));
        match load_model("empty.gltf", &doc, &[]) {
            Err(SceneError::NoScene) => {}
            other => panic!("expected no scene error, got {:?}", other),
        }
    }
}
