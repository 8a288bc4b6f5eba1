//! wgpu renderer
//!
//! Three stages per frame: shadow maps for the spotlights, the forward lit
//! pass, then a caller-provided overlay recorded into the same encoder.
//! Scene data stays CPU-side; this module uploads geometry lazily the first
//! time a mesh is drawn and rewrites the small per-object uniforms each
//! frame.

pub mod context;
pub mod data;
pub mod forward;
pub mod shadow;

pub use context::GpuContext;

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::Zeroable;
use glam::Mat4;
use slotmap::SecondaryMap;
use winit::window::Window;

use crate::errors::{Result, ViewerError};
use crate::scene::{LightKind, NodeHandle, Scene, TextureData};
use crate::settings::RenderSettings;
use data::{
    CameraUniform, GpuObject, GpuTexture, LightsUniform, ModelUniform, SpotLightUniform,
    MAX_SPOT_LIGHTS,
};
use forward::ForwardPass;
use shadow::ShadowPass;

pub struct Renderer {
    ctx: GpuContext,
    clear_color: wgpu::Color,

    object_bgl: wgpu::BindGroupLayout,
    material_bgl: wgpu::BindGroupLayout,
    shadow: ShadowPass,
    forward: ForwardPass,

    linear_sampler: wgpu::Sampler,
    white_texture: GpuTexture,
    flat_normal_texture: GpuTexture,
    identity_joints: wgpu::Buffer,

    texture_cache: HashMap<usize, GpuTexture>,
    objects: SecondaryMap<NodeHandle, GpuObject>,
    draw_list: Vec<NodeHandle>,
    caster_list: Vec<NodeHandle>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self> {
        let ctx = GpuContext::new(window, settings).await?;
        let device = &ctx.device;

        let object_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let material_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shadow = ShadowPass::new(
            device,
            &object_bgl,
            settings.depth_format,
            settings.shadow_map_size,
        );
        let forward = ForwardPass::new(
            device,
            &object_bgl,
            &material_bgl,
            ctx.config.format,
            settings.depth_format,
            shadow.array_view(),
            shadow.comparison_sampler(),
        );

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture = GpuTexture::upload(
            device,
            &ctx.queue,
            &TextureData::solid([255, 255, 255, 255], true),
        );
        let flat_normal_texture = GpuTexture::upload(
            device,
            &ctx.queue,
            &TextureData::solid([128, 128, 255, 255], false),
        );

        let identity_joints = {
            use wgpu::util::DeviceExt;
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Identity Joints"),
                contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array()),
                usage: wgpu::BufferUsages::STORAGE,
            })
        };

        Ok(Self {
            ctx,
            clear_color: settings.clear_color,
            object_bgl,
            material_bgl,
            shadow,
            forward,
            linear_sampler,
            white_texture,
            flat_normal_texture,
            identity_joints,
            texture_cache: HashMap::new(),
            objects: SecondaryMap::new(),
            draw_list: Vec::new(),
            caster_list: Vec::new(),
        })
    }

    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.ctx.device
    }

    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.ctx.queue
    }

    #[must_use]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.ctx.config.format
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.ctx.aspect_ratio()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    /// Renders one frame. `draw_ui` is invoked with the frame's encoder and
    /// target view after the lit pass; any command buffers it returns (for
    /// example texture uploads) are submitted ahead of the frame.
    ///
    /// A lost or outdated surface reconfigures and skips the frame.
    pub fn render<F>(&mut self, scene: &mut Scene, draw_ui: F) -> Result<()>
    where
        F: FnOnce(
            &wgpu::Device,
            &wgpu::Queue,
            &mut wgpu::CommandEncoder,
            &wgpu::TextureView,
        ) -> Vec<wgpu::CommandBuffer>,
    {
        let frame = match self.ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.ctx.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface acquisition timed out, skipping frame");
                return Ok(());
            }
            Err(err) => {
                return Err(ViewerError::SurfaceError(err.to_string()));
            }
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let camera_uniform = self.update_camera(scene);
        let (lights_uniform, shadow_matrices) = collect_lights(scene);
        self.sync_objects(scene);

        self.forward.write_camera(&self.ctx.queue, &camera_uniform);
        self.forward.write_lights(&self.ctx.queue, &lights_uniform);
        self.shadow
            .write_light_matrices(&self.ctx.queue, &shadow_matrices);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let casters: Vec<&GpuObject> = self
            .caster_list
            .iter()
            .filter_map(|&h| self.objects.get(h))
            .collect();
        self.shadow
            .record(&mut encoder, shadow_matrices.len(), casters.iter().copied());

        self.forward.record(
            &mut encoder,
            &target,
            &self.ctx.depth_view,
            self.clear_color,
            self.draw_list.iter().filter_map(|&h| self.objects.get(h)),
        );

        let mut commands = draw_ui(&self.ctx.device, &self.ctx.queue, &mut encoder, &target);
        commands.push(encoder.finish());
        self.ctx.queue.submit(commands);
        frame.present();

        Ok(())
    }

    /// Refreshes the active camera's view matrix and packs its uniform.
    fn update_camera(&self, scene: &mut Scene) -> CameraUniform {
        let Some(handle) = scene.active_camera else {
            return CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                position: [0.0; 4],
            };
        };
        let world = scene
            .get_node(handle)
            .map(|n| *n.transform.world_matrix())
            .unwrap_or_default();
        let Some(camera) = scene.get_camera_mut(handle) else {
            return CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                position: [0.0; 4],
            };
        };
        camera.update_view_projection(&world);
        let p = world.translation;
        CameraUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [p.x, p.y, p.z, 1.0],
        }
    }

    /// Uploads geometry for new meshes and rewrites per-object uniforms,
    /// rebuilding the frame's draw and shadow-caster lists.
    fn sync_objects(&mut self, scene: &Scene) {
        self.draw_list.clear();
        self.caster_list.clear();

        for (handle, mesh) in scene.iter_meshes() {
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            if !node.visible {
                continue;
            }

            if !self.objects.contains_key(handle) {
                let object = self.create_object(scene, handle, mesh);
                self.objects.insert(handle, object);
            }

            let skinned = mesh.geometry.is_skinned() && scene.get_skin(handle).is_some();
            let uniform = ModelUniform {
                model: node.transform.world_matrix_as_mat4().to_cols_array_2d(),
                base_color: [
                    mesh.material.base_color.x,
                    mesh.material.base_color.y,
                    mesh.material.base_color.z,
                    1.0,
                ],
                flags: [
                    u32::from(mesh.material.color_map.is_some()),
                    u32::from(mesh.material.use_normal_map && mesh.material.normal_map.is_some()),
                    u32::from(skinned),
                    0,
                ],
            };
            let object = &mut self.objects[handle];
            object.cast_shadow = mesh.cast_shadow;
            self.ctx
                .queue
                .write_buffer(&object.model_buffer, 0, bytemuck::bytes_of(&uniform));

            if skinned
                && let Some(key) = scene.get_skin(handle)
                && let Some(skeleton) = scene.skeletons.get(key)
                && let Some(joints_buffer) = object.joints_buffer.as_ref()
            {
                self.ctx.queue.write_buffer(
                    joints_buffer,
                    0,
                    bytemuck::cast_slice(skeleton.joint_matrices()),
                );
            }

            self.draw_list.push(handle);
            if mesh.cast_shadow {
                self.caster_list.push(handle);
            }
        }
    }

    fn create_object(
        &mut self,
        scene: &Scene,
        handle: NodeHandle,
        mesh: &crate::scene::Mesh,
    ) -> GpuObject {
        let device = &self.ctx.device;

        let vertices = data::interleave(&mesh.geometry);
        let vertex_buffer = data::create_vertex_buffer(device, &vertices);
        let index_buffer = data::create_index_buffer(device, &mesh.geometry.indices);

        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform"),
            size: std::mem::size_of::<ModelUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let joints_buffer = scene
            .get_skin(handle)
            .and_then(|key| scene.skeletons.get(key))
            .map(|skeleton| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Joint Matrices"),
                    size: (skeleton.joint_matrices().len().max(1) * 64) as u64,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            });

        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BG"),
            layout: &self.object_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: joints_buffer
                        .as_ref()
                        .unwrap_or(&self.identity_joints)
                        .as_entire_binding(),
                },
            ],
        });

        let color_view = mesh
            .material
            .color_map
            .as_ref()
            .map(|t| self.texture_view_for(t))
            .unwrap_or_else(|| self.white_texture.view.clone());
        let normal_view = mesh
            .material
            .normal_map
            .as_ref()
            .map(|t| self.texture_view_for(t))
            .unwrap_or_else(|| self.flat_normal_texture.view.clone());

        let material_bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material BG"),
            layout: &self.material_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
            ],
        });

        GpuObject {
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.indices.len() as u32,
            model_buffer,
            joints_buffer,
            object_bind_group,
            material_bind_group,
            cast_shadow: mesh.cast_shadow,
        }
    }

    /// Uploads `data` on first use, keyed by the shared allocation.
    fn texture_view_for(&mut self, data: &Arc<TextureData>) -> wgpu::TextureView {
        let key = Arc::as_ptr(data) as usize;
        if let Some(texture) = self.texture_cache.get(&key) {
            return texture.view.clone();
        }
        let texture = GpuTexture::upload(&self.ctx.device, &self.ctx.queue, data);
        let view = texture.view.clone();
        self.texture_cache.insert(key, texture);
        view
    }
}

/// Packs the scene's lights into the forward uniform and collects the
/// shadow view-projection matrices, one per spotlight in layer order.
fn collect_lights(scene: &Scene) -> (LightsUniform, Vec<Mat4>) {
    let mut uniform = LightsUniform {
        spots: [SpotLightUniform::zeroed(); MAX_SPOT_LIGHTS],
        ambient: [0.0; 4],
        counts: [0; 4],
    };
    let mut shadow_matrices = Vec::new();
    let mut spot_count = 0usize;

    for (_, light, world) in scene.iter_visible_lights() {
        match &light.kind {
            LightKind::Ambient => {
                uniform.ambient = [light.color.x, light.color.y, light.color.z, light.intensity];
            }
            LightKind::Spot(spot) => {
                if spot_count >= MAX_SPOT_LIGHTS {
                    log::warn!("More than {MAX_SPOT_LIGHTS} spotlights, ignoring extras");
                    continue;
                }
                let position = world.translation;
                let direction = world.transform_vector3(-glam::Vec3::Z).normalize_or(-glam::Vec3::Z);
                let vp = light.shadow_view_projection(world);
                uniform.spots[spot_count] = SpotLightUniform {
                    view_proj: vp.to_cols_array_2d(),
                    position_range: [position.x, position.y, position.z, spot.range],
                    direction: [direction.x, direction.y, direction.z, 0.0],
                    color_intensity: [
                        light.color.x,
                        light.color.y,
                        light.color.z,
                        light.intensity,
                    ],
                    cone: [
                        spot.inner_cone.cos(),
                        spot.outer_cone.cos(),
                        light.shadow.bias,
                        f32::from(u8::from(light.cast_shadows)),
                    ],
                };
                shadow_matrices.push(vp);
                spot_count += 1;
            }
        }
    }

    uniform.counts[0] = spot_count as u32;
    (uniform, shadow_matrices)
}
