//! Viewer Configuration
//!
//! Two explicit configuration records:
//!
//! - [`RenderSettings`]: consumed once during renderer initialization.
//! - [`DebugSettings`]: the runtime-tunable state behind the debug panel.
//!   Owned by the application; the panel receives `&mut`, every other
//!   component reads it through `&`.

use crate::animation::ClipKey;

/// Runtime-tunable parameters exposed by the debug panel.
///
/// The panel is the only writer. The animation controller reads
/// `selected_animation`, the scene builder and light sync read the spotlight
/// fields, and the renderer reads `use_normal_map`.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugSettings {
    /// Currently selected animation, `None` means nothing plays.
    pub selected_animation: Option<ClipKey>,
    /// Spotlight intensity, shared by all three spotlights. Range [0.01, 3].
    pub light_intensity: f32,
    /// Spotlight cone half-angle in radians. Range [0.001, 1].
    pub light_angle: f32,
    /// Spotlight penumbra (0 = hard edge, 1 = fully soft). Range [0.001, 1].
    pub penumbra: f32,
    /// Whether the ground plate samples its normal map.
    pub use_normal_map: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            selected_animation: Some(ClipKey::Walk),
            light_intensity: 2.0,
            light_angle: 0.2 * std::f32::consts::PI,
            penumbra: 0.1,
            use_normal_map: true,
        }
    }
}

/// Global configuration for renderer initialization.
///
/// Consumed once when the GPU context is created.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Enable vertical synchronization.
    pub vsync: bool,
    /// GPU adapter selection preference.
    pub power_preference: wgpu::PowerPreference,
    /// Background clear color for the main render target.
    pub clear_color: wgpu::Color,
    /// Required wgpu features that must be supported by the adapter.
    pub required_features: wgpu::Features,
    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,
    /// Depth buffer texture format.
    pub depth_format: wgpu::TextureFormat,
    /// Shadow map resolution (square, per light).
    pub shadow_map_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.07,
                a: 1.0,
            },
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            shadow_map_size: 2048,
        }
    }
}
