use crate::SceneError;

/// Accessor component types the decoder understands, by glTF code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    pub fn from_code(code: u32) -> Result<Self, SceneError> {
        match code {
            5121 => Ok(ComponentType::UnsignedByte),
            5123 => Ok(ComponentType::UnsignedShort),
            5125 => Ok(ComponentType::UnsignedInt),
            5126 => Ok(ComponentType::Float),
            other => Err(SceneError::UnsupportedComponentType(other)),
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            ComponentType::UnsignedByte => 1,
            ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }
}

/// Flattened accessor payload, tagged by component type.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl BufferData {
    pub fn len(&self) -> usize {
        match self {
            BufferData::U8(v) => v.len(),
            BufferData::U16(v) => v.len(),
            BufferData::U32(v) => v.len(),
            BufferData::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widens the payload into the flat float array the renderer and the
    /// animation decoder consume.
    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            BufferData::U8(v) => v.iter().map(|&x| x as f32).collect(),
            BufferData::U16(v) => v.iter().map(|&x| x as f32).collect(),
            BufferData::U32(v) => v.iter().map(|&x| x as f32).collect(),
            BufferData::F32(v) => v.clone(),
        }
    }

    /// Flattens the payload into element indices.
    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            BufferData::U8(v) => v.iter().map(|&x| x as u32).collect(),
            BufferData::U16(v) => v.iter().map(|&x| x as u32).collect(),
            BufferData::U32(v) => v.clone(),
            BufferData::F32(v) => v.iter().map(|&x| x as u32).collect(),
        }
    }
}

/// A decoded vertex attribute: flat payload plus its element layout.
#[derive(Debug, Clone)]
pub struct AttributeBuffer {
    pub data: BufferData,
    /// Scalar components per element (VEC3 -> 3).
    pub size: usize,
    /// Number of elements, `data.len() / size`.
    pub count: usize,
    pub component: ComponentType,
}

/// Triangle indices of a mesh primitive.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    pub data: BufferData,
    pub count: usize,
}

/// Geometry of one decoded mesh primitive.
///
/// Only positions are guaranteed; every other attribute is present exactly
/// when the source asset carried it. Without indices the positions form an
/// unindexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub indices: Option<IndexBuffer>,
    pub positions: AttributeBuffer,
    pub normals: Option<AttributeBuffer>,
    pub tangents: Option<AttributeBuffer>,
    pub tex_coords: Option<AttributeBuffer>,
    pub joints: Option<AttributeBuffer>,
    pub weights: Option<AttributeBuffer>,
}
