//! Pinhole camera for ray generation.

use flow_core::CameraDesc;
use flow_math::{Ray, Transform, Vec3, Vec4};

/// Pinhole camera looking down its local -Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    transform: Transform,
    /// Vertical field of view in degrees
    fov: f32,
    /// Image width / height
    aspect: f32,
}

impl Camera {
    pub fn new(transform: Transform, fov: f32, aspect: f32) -> Self {
        Self {
            transform,
            fov,
            aspect,
        }
    }

    /// Camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov: f32, aspect: f32) -> Self {
        Self::new(Transform::look_at(eye, target, up), fov, aspect)
    }

    /// Camera for a scene description rendered at `aspect`.
    pub fn from_description(desc: &CameraDesc, aspect: f32) -> Self {
        Self::new(Transform::from_model(desc.model), desc.vertical_fov(aspect), aspect)
    }

    /// Set the vertical field of view.
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Set the aspect ratio.
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Ray through image-plane point `(s, t)`, both in `[-1, 1]`. `(-1, 1)`
    /// is the top-left corner of the image.
    pub fn get_ray(&self, s: f32, t: f32) -> Ray {
        let half_height = (self.fov.to_radians() / 2.0).tan();
        let half_width = self.aspect * half_height;

        let origin = self.transform.translation();
        let direction = self.transform.model()
            * Vec4::new(s * half_width, t * half_height, -1.0, 0.0);
        Ray::new(origin, direction.truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::FovAxis;

    #[test]
    fn test_center_ray() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y, 45.0, 1.0);
        let ray = camera.get_ray(0.0, 0.0);

        assert!((ray.origin() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
        assert!((ray.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_corner_rays_span_fov() {
        let camera = Camera::look_at(Vec3::ZERO, -Vec3::Z, Vec3::Y, 90.0, 2.0);

        // tan(45) = 1 vertically, 2 horizontally
        let top = camera.get_ray(0.0, 1.0).direction();
        assert!((top - Vec3::new(0.0, 1.0, -1.0).normalize()).length() < 1e-5);

        let right = camera.get_ray(1.0, 0.0).direction();
        assert!((right - Vec3::new(2.0, 0.0, -1.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_from_description() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let desc = CameraDesc::look_at(eye, Vec3::new(1.0, 2.0, 0.0), Vec3::Y, 30.0);
        let camera = Camera::from_description(&desc, 1.5);

        assert_eq!(camera.fov(), 30.0);
        assert_eq!(camera.aspect(), 1.5);
        let ray = camera.get_ray(0.0, 0.0);
        assert!((ray.origin() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!((ray.direction() + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_shorter_axis_fov_follows_render_aspect() {
        let mut desc = CameraDesc::look_at(Vec3::ZERO, -Vec3::Z, Vec3::Y, 90.0);
        desc.fov_axis = FovAxis::Shorter;

        let landscape = Camera::from_description(&desc, 2.0);
        assert_eq!(landscape.fov(), 90.0);

        // In portrait the horizontal half-extent is tan(45) = 1
        let portrait = Camera::from_description(&desc, 0.5);
        let right = portrait.get_ray(1.0, 0.0).direction();
        assert!((right - Vec3::new(1.0, 0.0, -1.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_builder() {
        let camera = Camera::new(Transform::IDENTITY, 45.0, 1.0)
            .with_fov(60.0)
            .with_aspect(2.0);
        assert_eq!(camera.fov(), 60.0);
        assert_eq!(camera.aspect(), 2.0);
    }
}
