//! Model/inverse-model matrix pair.
//!
//! Both matrices are always derived from one another so that a Transform can
//! never hold an inconsistent pair.

use glam::{Mat4, Vec3, Vec4};

/// An affine placement in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    model: Mat4,
    imodel: Mat4,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        model: Mat4::IDENTITY,
        imodel: Mat4::IDENTITY,
    };

    /// Build from a local-to-world matrix.
    pub fn from_model(model: Mat4) -> Self {
        Self {
            model,
            imodel: model.inverse(),
        }
    }

    /// Build from a world-to-local matrix (e.g. a view matrix).
    pub fn from_imodel(imodel: Mat4) -> Self {
        Self {
            model: imodel.inverse(),
            imodel,
        }
    }

    /// Right-handed look-at placement: local -Z points from `eye` to `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::from_imodel(Mat4::look_at_rh(eye, target, up))
    }

    /// Local-to-world matrix.
    #[inline]
    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// World-to-local matrix.
    #[inline]
    pub fn imodel(&self) -> Mat4 {
        self.imodel
    }

    /// World-space position of the local origin.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }

    /// Transform a point (w=1).
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.model.transform_point3(point)
    }

    /// Transform a direction (w=0) - translation does not apply.
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        (self.model * Vec4::new(vector.x, vector.y, vector.z, 0.0)).truncate()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_mat_close(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-4), "{a:?} != {b:?}");
    }

    #[test]
    fn test_from_model_round_trip() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 0.5),
            glam::Quat::from_rotation_y(PI / 3.0),
            Vec3::new(10.0, -4.0, 7.0),
        );
        let transform = Transform::from_model(model);

        assert_eq!(transform.model(), model);
        assert_mat_close(transform.model() * transform.imodel(), Mat4::IDENTITY);
        assert_mat_close(transform.imodel() * transform.model(), Mat4::IDENTITY);
    }

    #[test]
    fn test_from_imodel_round_trip() {
        let imodel = Mat4::from_rotation_x(0.3) * Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let transform = Transform::from_imodel(imodel);

        assert_eq!(transform.imodel(), imodel);
        assert_mat_close(transform.model(), imodel.inverse());
    }

    #[test]
    fn test_translation() {
        let transform = Transform::from_model(Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0)));
        assert_eq!(transform.translation(), Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(transform.transform_point(Vec3::ONE), Vec3::new(11.0, 21.0, 31.0));
    }

    #[test]
    fn test_transform_vector_no_translation() {
        let transform = Transform::from_model(Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0)));
        assert_eq!(transform.transform_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_transform_vector_rotation() {
        // 90 degree rotation around Z axis
        let transform = Transform::from_model(Mat4::from_rotation_z(PI / 2.0));
        let rotated = transform.transform_vector(Vec3::X);

        assert!((rotated - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_look_at_places_eye() {
        let eye = Vec3::new(0.0, 0.0, 3.0);
        let transform = Transform::look_at(eye, Vec3::ZERO, Vec3::Y);

        assert!((transform.translation() - eye).length() < 1e-5);
        // Local -Z looks at the target
        let forward = transform.transform_vector(-Vec3::Z);
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
