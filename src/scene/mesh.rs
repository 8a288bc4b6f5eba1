use std::sync::Arc;

use glam::Vec3;

/// CPU-side vertex data. Uploaded once by the renderer; never mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Joint indices for skinned meshes, four influences per vertex.
    pub joints: Option<Vec<[u16; 4]>>,
    /// Joint weights for skinned meshes.
    pub weights: Option<Vec<[f32; 4]>>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }

    /// A flat disc in the XY plane facing +Z, triangulated as a fan around
    /// the center. Rotate the owning node to lay it horizontally.
    #[must_use]
    pub fn disc(radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut positions = Vec::with_capacity(segments as usize + 2);
        let mut normals = Vec::with_capacity(segments as usize + 2);
        let mut uvs = Vec::with_capacity(segments as usize + 2);

        positions.push([0.0, 0.0, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([0.5, 0.5]);

        for i in 0..=segments {
            let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
            let (sin, cos) = angle.sin_cos();
            positions.push([radius * cos, radius * sin, 0.0]);
            normals.push([0.0, 0.0, 1.0]);
            uvs.push([0.5 + 0.5 * cos, 0.5 + 0.5 * sin]);
        }

        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 1..=segments {
            indices.extend_from_slice(&[0, i, i + 1]);
        }

        Self {
            positions,
            normals,
            uvs,
            joints: None,
            weights: None,
            indices,
        }
    }
}

/// Decoded RGBA8 image data, shared between the asset layer and materials.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Color textures are sRGB; normal maps and other data textures are not.
    pub srgb: bool,
}

impl TextureData {
    /// A 1x1 placeholder pixel, used for material slots without a map.
    #[must_use]
    pub fn solid(rgba: [u8; 4], srgb: bool) -> Self {
        Self {
            pixels: rgba.to_vec(),
            width: 1,
            height: 1,
            srgb,
        }
    }
}

/// Simple lit material: a base color modulated by an optional color map,
/// plus an optional tangent-space normal map behind a runtime toggle.
#[derive(Debug, Clone)]
pub struct Material {
    pub base_color: Vec3,
    pub color_map: Option<Arc<TextureData>>,
    pub normal_map: Option<Arc<TextureData>>,
    /// Runtime switch for the normal map; flipping it does not require a
    /// material rebuild, only a uniform update.
    pub use_normal_map: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec3::ONE,
            color_map: None,
            normal_map: None,
            use_normal_map: true,
        }
    }
}

/// Renderable component: geometry, material, and shadow participation flags.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}
