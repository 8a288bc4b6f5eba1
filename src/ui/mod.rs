//! egui overlay
//!
//! [`UiLayer`] couples the egui context with its winit event bridge and the
//! wgpu painter. The overlay renders into the frame's target view with a
//! load op, after the lit pass. [`panel`] holds the actual debug panel.

pub mod panel;

pub use panel::{debug_panel, PanelResponse};

use egui_wgpu::{Renderer as EguiRenderer, RendererOptions, ScreenDescriptor};
use egui_winit::State as EguiWinit;
use winit::event::WindowEvent;
use winit::window::Window;

pub struct UiLayer {
    ctx: egui::Context,
    state: EguiWinit,
    painter: EguiRenderer,
}

impl UiLayer {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = EguiWinit::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            window.theme(),
            None,
        );
        let painter = EguiRenderer::new(device, format, RendererOptions::default());
        Self {
            ctx,
            state,
            painter,
        }
    }

    /// Forwards a window event to egui. Returns whether egui consumed it,
    /// in which case the scene input handling should skip it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Runs one egui frame over `build_ui`.
    pub fn run(
        &mut self,
        window: &Window,
        build_ui: impl FnMut(&egui::Context),
    ) -> egui::FullOutput {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.run(raw_input, build_ui)
    }

    /// Uploads the frame's texture changes, records the overlay pass into
    /// `encoder`, and returns any extra command buffers that must be
    /// submitted ahead of it.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        window: &Window,
        output: egui::FullOutput,
    ) -> Vec<wgpu::CommandBuffer> {
        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            pixels_per_point,
            ..
        } = output;
        self.state.handle_platform_output(window, platform_output);

        let size = window.inner_size();
        let screen = ScreenDescriptor {
            size_in_pixels: [size.width.max(1), size.height.max(1)],
            pixels_per_point,
        };

        for (id, delta) in &textures_delta.set {
            self.painter.update_texture(device, queue, *id, delta);
        }
        let primitives = self.ctx.tessellate(shapes, pixels_per_point);
        let commands = self
            .painter
            .update_buffers(device, queue, encoder, &primitives, &screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Ui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.painter.render(&mut pass, &primitives, &screen);
        }

        for id in &textures_delta.free {
            self.painter.free_texture(id);
        }

        commands
    }
}
