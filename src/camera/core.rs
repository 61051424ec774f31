use glam::{Mat4, Vec3};

use crate::options::CameraOptions;

/// Perspective camera defined by eye position, target, and projection
/// parameters.
///
/// The projection matrix is cached; call
/// [`update_projection`](Self::update_projection) after changing `aspect`,
/// `fovy`, `znear` or `zfar`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    projection: Mat4,
}

impl Camera {
    /// Build a camera from options at the given aspect ratio.
    #[must_use]
    pub fn from_options(options: &CameraOptions, aspect: f32) -> Self {
        let mut camera = Self {
            eye: Vec3::from_array(options.position),
            target: Vec3::from_array(options.target),
            up: Vec3::Y,
            aspect,
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    /// Set the aspect ratio and recompute the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }

    /// Recompute the cached projection matrix from the current parameters.
    pub fn update_projection(&mut self) {
        // perspective_rh already uses [0,1] depth range (wgpu convention)
        self.projection = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
    }

    /// The cached projection matrix.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// World-to-view matrix.
    ///
    /// When the view direction is parallel to `up` (e.g. looking straight
    /// down at the island), `-Z` is used as the up vector instead.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        let up = if forward.cross(self.up).length_squared() < 1e-10 {
            Vec3::NEG_Z
        } else {
            self.up
        };
        Mat4::look_at_rh(self.eye, self.target, up)
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Unit vector from eye toward target.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or(Vec3::NEG_Z)
    }

    /// Distance between eye and target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_options() {
        let camera = Camera::from_options(&CameraOptions::default(), 2.0);
        assert_eq!(camera.eye, Vec3::new(0.0, 35.0, 0.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.fovy, 75.0);
        assert_eq!(camera.znear, 0.1);
        assert_eq!(camera.zfar, 1000.0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn set_aspect_updates_projection() {
        let mut camera = Camera::from_options(&CameraOptions::default(), 1.0);
        let before = camera.projection();
        camera.set_aspect(16.0 / 9.0);
        assert_ne!(camera.projection(), before);
        let expected = Mat4::perspective_rh(
            75.0_f32.to_radians(),
            16.0 / 9.0,
            0.1,
            1000.0,
        );
        assert_eq!(camera.projection(), expected);
    }

    #[test]
    fn top_down_view_matrix_is_finite() {
        let camera = Camera::from_options(&CameraOptions::default(), 1.5);
        let view = camera.view_matrix();
        assert!(view.is_finite());
        // The target projects to the center of the view.
        let p = camera.build_matrix().project_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }
}
