use glam::{Affine3A, Mat4, Vec3};
use uuid::Uuid;

/// Shadow camera parameters for a shadow-casting light.
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    /// Depth bias applied when sampling, to suppress shadow acne.
    pub bias: f32,
    /// Shadow camera near plane.
    pub near: f32,
    /// Shadow camera far plane.
    pub far: f32,
    /// Shadow camera vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            near: 1.0,
            far: 10.0,
            fov_degrees: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    /// Distance beyond which the light contributes nothing.
    pub range: f32,
    /// Cone angle in radians at which falloff begins.
    pub inner_cone: f32,
    /// Cone half-angle in radians; outside this the light is zero.
    pub outer_cone: f32,
}

#[derive(Debug, Clone)]
pub enum LightKind {
    /// Uniform fill applied to every surface regardless of position.
    Ambient,
    Spot(SpotLight),
}

/// Light component attached to a scene node. A spot light shines along the
/// node's negative Z axis; aim it with `transform.look_at`.
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub cast_shadows: bool,
    pub shadow: ShadowConfig,
}

impl Light {
    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Ambient,
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_spot(
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone,
            }),
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    /// Updates the spot cone from an outer half-angle and a penumbra
    /// fraction: the inner cone shrinks toward zero as penumbra approaches 1.
    /// No-op for ambient lights.
    pub fn set_spot_cone(&mut self, outer_cone: f32, penumbra: f32) {
        if let LightKind::Spot(spot) = &mut self.kind {
            spot.outer_cone = outer_cone;
            spot.inner_cone = outer_cone * (1.0 - penumbra.clamp(0.0, 1.0));
        }
    }

    /// View-projection matrix of the shadow camera, looking along the node's
    /// forward axis. Only meaningful for spot lights.
    #[must_use]
    pub fn shadow_view_projection(&self, world: &Affine3A) -> Mat4 {
        let position = Vec3::from(world.translation);
        let direction = world.transform_vector3(-Vec3::Z).normalize_or(-Vec3::Z);
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-4 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(position, position + direction, up);
        let proj = Mat4::perspective_rh(
            self.shadow.fov_degrees.to_radians(),
            1.0,
            self.shadow.near,
            self.shadow.far,
        );
        proj * view
    }
}
