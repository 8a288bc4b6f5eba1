use glam::{Affine3A, Mat4};

/// Perspective camera component.
///
/// Holds projection parameters and the cached view/projection matrices the
/// renderer reads. The view matrix is the inverse of the owning node's world
/// matrix, refreshed via [`Camera::update_view_projection`].
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
}

impl Camera {
    /// Creates a perspective camera. `fov_degrees` is the vertical field of
    /// view in degrees, matching how scene setup code usually specifies it.
    #[must_use]
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Sets the aspect ratio and rebuilds the projection. Idempotent: calling
    /// repeatedly with the same value converges to the same matrices, so
    /// resize bursts are safe.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    pub fn update_projection_matrix(&mut self) {
        // glam's perspective_rh produces the [0, 1] depth range wgpu expects.
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// Refreshes the view matrix from the owning node's world transform.
    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection_matrix
    }
}
