use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::app::input::Input;
use crate::scene::transform::Transform;

/// Interactive orbit camera controller.
///
/// Left-drag rotates around a fixed pivot, scroll zooms in and out. When
/// damping is enabled, rotation input decays over a few frames instead of
/// stopping dead, matching the feel of a browser orbit control.
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    /// Orbit pivot in world space.
    pub center: Vec3,
    /// Distance from the pivot.
    pub radius: f32,
    /// Azimuth angle around the Y axis.
    pub theta: f32,
    /// Polar angle from the Y axis, clamped away from the poles.
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 2.0,
            max_distance: 60.0,

            center,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Positions the controller so the camera starts at `position` looking at
    /// `center`, converting the offset into spherical coordinates.
    #[must_use]
    pub fn from_position(position: Vec3, center: Vec3) -> Self {
        let offset = position - center;
        let radius = offset.length().max(1e-4);
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let theta = offset.x.atan2(offset.z);
        let mut controls = Self::new(center, radius);
        controls.theta = theta;
        controls.phi = phi;
        controls
    }

    /// Consumes this frame's input and writes the resulting camera pose into
    /// `transform`. Safe to call every frame regardless of input activity.
    pub fn update(&mut self, transform: &mut Transform, input: &Input, dt: f32) {
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            // One full drag across the window height is one full revolution.
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta.x -= input.cursor_delta.x * rotate_per_pixel * self.rotate_speed;
            self.rotate_delta.y -= input.cursor_delta.y * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            // Retention is normalized to a 60 fps reference so the decay feel
            // does not depend on frame rate.
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        const EPS: f32 = 0.0001;
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let offset = Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        );

        transform.position = self.center + offset;
        transform.look_at(self.center, Vec3::Y);
    }
}
