//! Spotlight shadow maps.
//!
//! Each shadow-casting spotlight renders the casters into one layer of a
//! depth array texture from the light's point of view. The forward pass
//! samples the array with a comparison sampler. Light view-projection
//! matrices live in a single uniform buffer addressed by dynamic offset,
//! one aligned slot per light.

use glam::Mat4;

use super::data::{GpuObject, Vertex, MAX_SPOT_LIGHTS};

/// Matches the minimum uniform buffer offset alignment required by wgpu.
const LIGHT_VP_STRIDE: u64 = 256;

pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    light_vp_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    layer_views: Vec<wgpu::TextureView>,
    array_view: wgpu::TextureView,
    comparison_sampler: wgpu::Sampler,
}

impl ShadowPass {
    pub fn new(
        device: &wgpu::Device,
        object_bgl: &wgpu::BindGroupLayout,
        depth_format: wgpu::TextureFormat,
        map_size: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });

        let light_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Light BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(64),
                },
                count: None,
            }],
        });

        let light_vp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Light VP Buffer"),
            size: LIGHT_VP_STRIDE * MAX_SPOT_LIGHTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Light BG"),
            layout: &light_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &light_vp_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(64),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&light_bgl, object_bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Front-face culling pushes acne onto back faces.
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let map = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: map_size,
                height: map_size,
                depth_or_array_layers: MAX_SPOT_LIGHTS as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let array_view = map.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let layer_views = (0..MAX_SPOT_LIGHTS as u32)
            .map(|layer| {
                map.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Shadow Map Layer"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            pipeline,
            light_vp_buffer,
            light_bind_group,
            layer_views,
            array_view,
            comparison_sampler,
        }
    }

    #[must_use]
    pub fn array_view(&self) -> &wgpu::TextureView {
        &self.array_view
    }

    #[must_use]
    pub fn comparison_sampler(&self) -> &wgpu::Sampler {
        &self.comparison_sampler
    }

    /// Uploads the view-projection matrices of the shadow-casting lights,
    /// one aligned slot each.
    pub fn write_light_matrices(&self, queue: &wgpu::Queue, matrices: &[Mat4]) {
        for (i, vp) in matrices.iter().take(MAX_SPOT_LIGHTS).enumerate() {
            queue.write_buffer(
                &self.light_vp_buffer,
                i as u64 * LIGHT_VP_STRIDE,
                bytemuck::cast_slice(&vp.to_cols_array()),
            );
        }
    }

    /// Records one depth-only pass per light into its shadow map layer.
    pub fn record<'a>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        light_count: usize,
        casters: impl Iterator<Item = &'a GpuObject> + Clone,
    ) {
        for light_index in 0..light_count.min(MAX_SPOT_LIGHTS) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.layer_views[light_index],
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            let offset = (light_index as u64 * LIGHT_VP_STRIDE) as u32;
            pass.set_bind_group(0, &self.light_bind_group, &[offset]);

            for object in casters.clone() {
                pass.set_bind_group(1, &object.object_bind_group, &[]);
                pass.set_vertex_buffer(0, object.vertex_buffer.slice(..));
                pass.set_index_buffer(object.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..object.index_count, 0, 0..1);
            }
        }
    }
}
