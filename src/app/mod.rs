//! Application shell
//!
//! Owns the winit event loop, the renderer, the egui overlay, and the scene
//! state. The render loop runs on `RedrawRequested`: advance the wall-clock
//! timer, run the debug panel, push settings changes into the scene, step
//! the animation, update the orbit camera, then render.

pub mod input;

use std::sync::Arc;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::animation::AnimationController;
use crate::assets::LoadedResources;
use crate::errors::{Result, ViewerError};
use crate::render::Renderer;
use crate::scene::builder::{apply_light_settings, build_scene, set_normal_map, SceneHandles};
use crate::scene::Scene;
use crate::settings::{DebugSettings, RenderSettings};
use crate::ui::{debug_panel, PanelResponse, UiLayer};
use crate::utils::{FpsCounter, OrbitControls, Timer};
use input::Input;

const WINDOW_TITLE: &str = "Fox Viewer";
const INITIAL_SIZE: PhysicalSize<u32> = PhysicalSize::new(1280, 720);

pub struct App {
    resources: Option<LoadedResources>,
    settings: DebugSettings,
    render_settings: RenderSettings,

    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    ui: Option<UiLayer>,

    scene: Option<Scene>,
    handles: Option<SceneHandles>,
    controller: AnimationController,
    orbit: OrbitControls,

    input: Input,
    timer: Timer,
    fps: FpsCounter,

    exit_error: Option<ViewerError>,
}

impl App {
    #[must_use]
    pub fn new(resources: LoadedResources) -> Self {
        Self {
            resources: Some(resources),
            settings: DebugSettings::default(),
            render_settings: RenderSettings::default(),
            window: None,
            renderer: None,
            ui: None,
            scene: None,
            handles: None,
            controller: AnimationController::new(),
            orbit: OrbitControls::new(Vec3::ZERO, 10.0),
            input: Input::new(),
            timer: Timer::new(),
            fps: FpsCounter::new(),
            exit_error: None,
        }
    }

    /// Runs the event loop until the window closes or a fatal error occurs.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        match self.exit_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{err}");
        self.exit_error = Some(err);
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(INITIAL_SIZE);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let renderer = pollster::block_on(Renderer::new(window.clone(), &self.render_settings))?;
        let ui = UiLayer::new(&window, renderer.device(), renderer.surface_format());

        let resources = self
            .resources
            .take()
            .ok_or_else(|| ViewerError::AssetNotFound("resources already consumed".to_string()))?;
        let built = build_scene(&resources, &self.settings, renderer.aspect_ratio())?;

        self.controller.bind(built.handles.fox_root, built.clips);
        self.controller
            .select(&built.scene, self.settings.selected_animation);

        let camera_position = built
            .scene
            .get_node(built.handles.camera)
            .map_or(Vec3::new(4.0, 5.0, 8.0), |n| n.transform.position);
        self.orbit = OrbitControls::from_position(camera_position, Vec3::ZERO);

        let size = window.inner_size();
        self.input.handle_resize(size.width, size.height);

        self.scene = Some(built.scene);
        self.handles = Some(built.handles);
        self.renderer = Some(renderer);
        self.ui = Some(ui);
        self.window = Some(window);
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.resize(size.width, size.height);
        self.input.handle_resize(size.width, size.height);

        let aspect = renderer.aspect_ratio();
        if let (Some(scene), Some(handles)) = (self.scene.as_mut(), self.handles.as_ref())
            && let Some(camera) = scene.get_camera_mut(handles.camera)
        {
            camera.set_aspect(aspect);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let (Some(renderer), Some(ui), Some(scene), Some(handles)) = (
            self.renderer.as_mut(),
            self.ui.as_mut(),
            self.scene.as_mut(),
            self.handles.as_ref(),
        ) else {
            return;
        };

        self.timer.tick();
        let dt = self.timer.dt_seconds();

        let mut response = PanelResponse::default();
        let output = ui.run(&window, |ctx| {
            response = debug_panel(ctx, &mut self.settings);
        });

        if response.selection_changed {
            self.controller
                .select(scene, self.settings.selected_animation);
        }
        if response.lights_changed {
            apply_light_settings(scene, handles, &self.settings);
        }
        if response.normal_map_changed {
            set_normal_map(scene, handles, self.settings.use_normal_map);
        }

        self.controller.update(dt, scene);

        if let Some(node) = scene.get_node_mut(handles.camera) {
            self.orbit.update(&mut node.transform, &self.input, dt);
        }

        scene.update();

        let result = renderer.render(scene, |device, queue, encoder, view| {
            ui.paint(device, queue, encoder, view, &window, output)
        });
        if let Err(err) = result {
            self.fail(event_loop, err);
            return;
        }

        if let Some(fps) = self.fps.update() {
            window.set_title(&format!("{WINDOW_TITLE} | {fps:.0} FPS"));
        }

        self.input.end_frame();
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.initialize(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if id != window.id() {
            return;
        }

        // The overlay sees events first; consumed events stay out of the
        // camera controls.
        let consumed = self
            .ui
            .as_mut()
            .is_some_and(|ui| ui.on_window_event(&window, &event));

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::CursorMoved { position, .. } => {
                // The cursor position feeds deltas even while the overlay is
                // hovered, so a drag that leaves the panel stays smooth.
                self.input.handle_cursor_move(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } if !consumed => {
                self.input.handle_mouse_input(state, button);
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                self.input.handle_mouse_wheel(delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
