pub mod camera;
pub mod graph;
pub mod loaders;
pub mod mesh;
pub mod terrain;

pub use camera::{perspective, FirstPersonCamera};
pub use graph::animation::{
    animation_transforms, sample, ActiveAnimation, Animation, AnimationState, Interpolate,
    KeyFrame, NodeChannels,
};
pub use graph::{Model, Node, Skin};
pub use loaders::{GltfLoader, ObjectLoader};
pub use mesh::{AttributeBuffer, BufferData, ComponentType, IndexBuffer, Mesh};
pub use terrain::{Terrain, TerrainMesh};

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding or loading scene assets.
///
/// Everything here is fatal for the asset being decoded. Recoverable
/// oddities (missing inverse bind matrices, degenerate keyframe windows,
/// unknown animation target paths) degrade locally instead of erroring.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("invalid model document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
    #[error("document contains no scene with nodes")]
    NoScene,
    #[error("unsupported accessor component type {0}")]
    UnsupportedComponentType(u32),
    #[error("mesh {0} has no POSITION attribute")]
    MissingPositions(usize),
    #[error("accessor {accessor} needs {need} bytes but buffer {buffer} holds {len}")]
    AccessorOutOfBounds {
        accessor: usize,
        buffer: usize,
        need: usize,
        len: usize,
    },
    #[error("invalid {kind} index {index}")]
    InvalidIndex { kind: &'static str, index: usize },
    #[error("node {0} is part of a cycle in the scene graph")]
    MalformedSceneGraph(usize),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}
