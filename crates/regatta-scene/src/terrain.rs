use crate::SceneError;
use regatta_math::*;
use std::path::Path;

/// World-unit height per raw 8-bit heightmap sample.
const HEIGHT_SCALE: f32 = 0.03;

/// A heightmap-derived terrain sampled on a regular grid.
///
/// `heights` stores the raw samples row by row; world height is the sample
/// times `scale`. The grid spans `width` columns along +x and `depth` rows
/// along -z, one world unit apart.
#[derive(Debug, Clone)]
pub struct Terrain {
    pub width: usize,
    pub depth: usize,
    heights: Vec<f32>,
    pub scale: f32,
}

/// Flat triangle-list geometry handed to the external renderer.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Terrain {
    pub fn new(width: usize, depth: usize, heights: Vec<f32>) -> Self {
        Self {
            width,
            depth,
            heights,
            scale: HEIGHT_SCALE,
        }
    }

    /// Builds a terrain from the luminance channel of a decoded heightmap
    /// image.
    pub fn from_image(image: &image::DynamicImage) -> Self {
        let gray = image.to_luma8();
        let (width, depth) = gray.dimensions();
        let heights = gray.pixels().map(|p| p.0[0] as f32).collect();
        Self::new(width as usize, depth as usize, heights)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        Ok(Self::from_image(&image::open(path)?))
    }

    /// Height at a grid vertex.
    pub fn vertex_height(&self, x: usize, z: usize) -> f32 {
        self.heights[z * self.width + x] * self.scale
    }

    /// Bilinearly interpolated height at a fractional grid position. The
    /// position must stay inside the grid: the far neighbors at `x + 1` and
    /// `z + 1` are read.
    pub fn interpolate_height(&self, x: f32, z: f32) -> f32 {
        let floor_x = x.floor();
        let floor_z = z.floor();
        let fraction_x = x - floor_x;
        let fraction_z = z - floor_z;
        let ix = floor_x as usize;
        let iz = floor_z as usize;

        let near = (1.0 - fraction_x) * self.vertex_height(ix, iz)
            + fraction_x * self.vertex_height(ix + 1, iz);
        let far = (1.0 - fraction_x) * self.vertex_height(ix, iz + 1)
            + fraction_x * self.vertex_height(ix + 1, iz + 1);

        (1.0 - fraction_z) * near + fraction_z * far
    }

    /// Expands the grid into renderable triangle geometry: two triangles
    /// per cell, per-vertex normals from the neighboring height deltas.
    pub fn to_trimesh(&self) -> TerrainMesh {
        let mut mesh = TerrainMesh::default();
        mesh.positions.reserve(self.width * self.depth * 3);
        mesh.normals.reserve(self.width * self.depth * 3);

        for z in 0..self.depth {
            for x in 0..self.width {
                let y = self.vertex_height(x, z);
                mesh.positions.extend_from_slice(&[x as f32, y, -(z as f32)]);

                // Edge rows fold inward for their neighbor samples.
                let (right, up) = if x + 1 < self.width && z + 1 < self.depth {
                    (
                        Vec3::new(1.0, self.vertex_height(x + 1, z) - y, 0.0),
                        Vec3::new(0.0, self.vertex_height(x, z + 1) - y, 1.0),
                    )
                } else {
                    (
                        Vec3::new(-1.0, self.vertex_height(x.saturating_sub(1), z) - y, 0.0),
                        Vec3::new(0.0, self.vertex_height(x, z.saturating_sub(1)) - y, -1.0),
                    )
                };
                let normal = up.cross(right).normalize();
                mesh.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
            }
        }

        for z in 0..self.depth.saturating_sub(1) {
            let next_z = z + 1;
            for x in 0..self.width.saturating_sub(1) {
                let next_x = x + 1;
                mesh.indices.extend_from_slice(&[
                    (z * self.width + x) as u32,
                    (z * self.width + next_x) as u32,
                    (next_z * self.width + x) as u32,
                ]);
                mesh.indices.extend_from_slice(&[
                    (z * self.width + next_x) as u32,
                    (next_z * self.width + next_x) as u32,
                    (next_z * self.width + x) as u32,
                ]);
            }
        }

        mesh
    }

    /// Column-major height rows for an external physics heightfield.
    pub fn to_height_grid(&self) -> Vec<Vec<f32>> {
        (0..self.width)
            .map(|x| (0..self.depth).map(|z| self.vertex_height(x, z)).collect())
            .collect()
    }
}
