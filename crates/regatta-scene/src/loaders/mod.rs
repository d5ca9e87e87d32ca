pub mod gltf;

pub use self::gltf::GltfLoader;

use crate::{graph::Model, SceneError};
use std::path::PathBuf;

/// Turns an asset on disk into a [`Model`]. All filesystem access lives
/// behind this seam; the decoding itself is pure.
pub trait ObjectLoader: std::fmt::Display {
    fn load(&self, path: PathBuf) -> Result<Model, SceneError>;
}
