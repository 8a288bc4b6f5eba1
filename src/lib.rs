pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod render;
pub mod scene;
pub mod settings;
pub mod ui;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationController, AnimationMixer, ClipKey, ClipSet, LoopMode};
pub use app::App;
pub use assets::{LoadedResources, ResourceLoader};
pub use errors::ViewerError;
pub use render::Renderer;
pub use scene::{Camera, Light, Node, Scene};
pub use scene::builder::{BuiltScene, SceneHandles, apply_light_settings, build_scene, set_normal_map};
pub use settings::{DebugSettings, RenderSettings};
pub use utils::orbit_control::OrbitControls;
