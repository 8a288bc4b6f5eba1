//! Debug panel.
//!
//! One small window with the animation selector, the three spotlight
//! sliders, and the normal-map toggle. The panel mutates [`DebugSettings`]
//! in place; [`PanelResponse`] tells the caller which groups changed so it
//! can push only those to the scene.

use crate::animation::ClipKey;
use crate::settings::DebugSettings;

/// Which settings groups the panel changed this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelResponse {
    pub selection_changed: bool,
    pub lights_changed: bool,
    pub normal_map_changed: bool,
}

impl PanelResponse {
    #[must_use]
    pub fn any(&self) -> bool {
        self.selection_changed || self.lights_changed || self.normal_map_changed
    }
}

fn selection_label(selection: Option<ClipKey>) -> &'static str {
    match selection {
        None => "(none)",
        Some(key) => key.label(),
    }
}

/// Builds the debug panel and applies edits to `settings`.
pub fn debug_panel(ctx: &egui::Context, settings: &mut DebugSettings) -> PanelResponse {
    let before = settings.clone();

    egui::Window::new("Debug")
        .default_width(220.0)
        .resizable(false)
        .show(ctx, |ui| {
            egui::ComboBox::from_label("animation")
                .selected_text(selection_label(settings.selected_animation))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut settings.selected_animation, None, "(none)");
                    for key in ClipKey::ALL {
                        ui.selectable_value(
                            &mut settings.selected_animation,
                            Some(key),
                            key.label(),
                        );
                    }
                });

            ui.separator();

            ui.add(
                egui::Slider::new(&mut settings.light_intensity, 0.01..=3.0)
                    .step_by(0.01)
                    .text("lightIntensity"),
            );
            ui.add(
                egui::Slider::new(&mut settings.light_angle, 0.001..=1.0)
                    .step_by(0.001)
                    .text("lightAngle"),
            );
            ui.add(
                egui::Slider::new(&mut settings.penumbra, 0.001..=1.0)
                    .step_by(0.001)
                    .text("penumbra"),
            );

            ui.separator();

            ui.checkbox(&mut settings.use_normal_map, "normalMap");
        });

    PanelResponse {
        selection_changed: settings.selected_animation != before.selected_animation,
        lights_changed: settings.light_intensity != before.light_intensity
            || settings.light_angle != before.light_angle
            || settings.penumbra != before.penumbra,
        normal_map_changed: settings.use_normal_map != before.use_normal_map,
    }
}
