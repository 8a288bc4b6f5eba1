//! GPU-side data layouts and upload helpers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::scene::{Geometry, TextureData};

pub const MAX_SPOT_LIGHTS: usize = 3;

/// Interleaved vertex layout shared by the shadow and forward pipelines.
/// Unskinned geometry carries zero weights and the shader falls back to the
/// plain model matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Uint32x4,
            4 => Float32x4,
        ],
    };
}

/// Interleaves CPU geometry into the vertex layout above.
#[must_use]
pub fn interleave(geometry: &Geometry) -> Vec<Vertex> {
    let count = geometry.positions.len();
    let mut vertices = Vec::with_capacity(count);
    for i in 0..count {
        let joints = geometry
            .joints
            .as_ref()
            .and_then(|j| j.get(i))
            .map_or([0; 4], |j| [j[0].into(), j[1].into(), j[2].into(), j[3].into()]);
        let weights = geometry
            .weights
            .as_ref()
            .and_then(|w| w.get(i))
            .copied()
            .unwrap_or([0.0; 4]);
        vertices.push(Vertex {
            position: geometry.positions[i],
            normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            joints,
            weights,
        });
    }
    vertices
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

/// One spotlight, packed for the forward pass.
///
/// `cone` holds (cos inner, cos outer, shadow bias, shadow enabled).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpotLightUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position_range: [f32; 4],
    pub direction: [f32; 4],
    pub color_intensity: [f32; 4],
    pub cone: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightsUniform {
    pub spots: [SpotLightUniform; MAX_SPOT_LIGHTS],
    /// Ambient fill, rgb plus intensity in w.
    pub ambient: [f32; 4],
    /// Active spotlight count in x.
    pub counts: [u32; 4],
}

/// Per-object uniform. `flags` holds (has color map, use normal map,
/// skinned, unused).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub flags: [u32; 4],
}

/// An uploaded texture with its view.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> Self {
        let format = if data.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Material Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Per-node GPU state: vertex/index buffers plus the object uniform and its
/// bind groups. Geometry is uploaded once; uniforms are rewritten per frame.
pub struct GpuObject {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub model_buffer: wgpu::Buffer,
    pub joints_buffer: Option<wgpu::Buffer>,
    pub object_bind_group: wgpu::BindGroup,
    pub material_bind_group: wgpu::BindGroup,
    pub cast_shadow: bool,
}

pub fn create_vertex_buffer(device: &wgpu::Device, vertices: &[Vertex]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Vertex Buffer"),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

pub fn create_index_buffer(device: &wgpu::Device, indices: &[u32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Index Buffer"),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    })
}
