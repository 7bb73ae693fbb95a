//! Scene description types for Flow.
//!
//! This module defines the renderer-agnostic scene representation that
//! scene files and scene-building functions produce. The renderer turns a
//! [`SceneDescription`] into its own intersectable scene.

use flow_math::{Mat4, Vec3};
use thiserror::Error;

use crate::mesh::{Mesh, MeshError};

/// Problems that make a description unrenderable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("image resolution {width}x{height} has no pixels")]
    EmptyImage { width: u32, height: u32 },

    #[error("samples per pixel must be at least 1")]
    NoSamples,

    #[error("field of view {0} is outside (0, 180) degrees")]
    InvalidFov(f32),

    #[error("shape '{name}': {source}")]
    InvalidShape {
        name: String,
        #[source]
        source: MeshError,
    },
}

/// Surface reflectance model of a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaterialDesc {
    /// Lambertian reflector.
    Diffuse { reflectance: Vec3 },
}

impl Default for MaterialDesc {
    fn default() -> Self {
        // pbrt's default diffuse reflectance
        MaterialDesc::Diffuse {
            reflectance: Vec3::splat(0.5),
        }
    }
}

/// Area light emission attached to a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emission {
    /// Emitted radiance color
    pub radiance: Vec3,
    /// Multiplier applied to `radiance`
    pub scale: f32,
}

impl Emission {
    pub fn new(radiance: Vec3, scale: f32) -> Self {
        Self { radiance, scale }
    }
}

/// A named mesh with its material and optional emission.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub name: String,
    pub mesh: Mesh,
    pub material: MaterialDesc,
    pub emission: Option<Emission>,
}

impl Shape {
    /// A diffuse, non-emitting shape.
    pub fn diffuse(name: impl Into<String>, mesh: Mesh, reflectance: Vec3) -> Self {
        Self {
            name: name.into(),
            mesh,
            material: MaterialDesc::Diffuse { reflectance },
            emission: None,
        }
    }

    /// An emitting shape.
    pub fn light(name: impl Into<String>, mesh: Mesh, emission: Emission) -> Self {
        Self {
            name: name.into(),
            mesh,
            material: MaterialDesc::default(),
            emission: Some(emission),
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.is_some()
    }
}

/// Image axis spanned by a camera's field of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FovAxis {
    #[default]
    Vertical,
    Horizontal,
    /// Whichever image axis is shorter (pbrt's convention)
    Shorter,
    /// Whichever image axis is longer
    Larger,
    /// The image diagonal
    Diagonal,
}

/// Pinhole camera placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraDesc {
    /// Camera-to-world matrix. The camera looks down its local -Z axis with
    /// +Y up.
    pub model: Mat4,
    /// Field of view in degrees, measured along `fov_axis`
    pub fov: f32,
    pub fov_axis: FovAxis,
}

impl CameraDesc {
    /// Camera at `eye` looking at `target` with a vertical field of view.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov: f32) -> Self {
        Self {
            model: Mat4::look_at_rh(eye, target, up).inverse(),
            fov,
            fov_axis: FovAxis::Vertical,
        }
    }

    /// Vertical field of view in degrees for an image of the given aspect
    /// ratio (width / height).
    pub fn vertical_fov(&self, aspect: f32) -> f32 {
        // Extent of the fov axis relative to the image height
        let extent = match self.fov_axis {
            FovAxis::Vertical => 1.0,
            FovAxis::Horizontal => aspect,
            FovAxis::Shorter => aspect.min(1.0),
            FovAxis::Larger => aspect.max(1.0),
            FovAxis::Diagonal => (1.0 + aspect * aspect).sqrt(),
        };
        if extent == 1.0 {
            return self.fov;
        }
        let half = (self.fov.to_radians() / 2.0).tan() / extent;
        2.0 * half.atan().to_degrees()
    }
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO, Vec3::Y, 45.0)
    }
}

/// Light transport algorithm requested by a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorKind {
    /// Path tracing with light sampling.
    #[default]
    Path,
    /// Debug view of surface normals.
    Normal,
}

impl IntegratorKind {
    /// Look up an integrator by its scene-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "path" => Some(IntegratorKind::Path),
            "normal" | "normals" => Some(IntegratorKind::Normal),
            _ => None,
        }
    }
}

/// Everything needed to render an image.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    /// Scene name (file stem or built-in name)
    pub name: String,
    pub camera: CameraDesc,
    pub shapes: Vec<Shape>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel
    pub samples: u32,
    /// Maximum path length
    pub max_depth: u32,
    pub integrator: IntegratorKind,
}

impl SceneDescription {
    /// Create an empty description with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            camera: CameraDesc::default(),
            shapes: Vec::new(),
            width: 512,
            height: 512,
            samples: 16,
            max_depth: 5,
            integrator: IntegratorKind::Path,
        }
    }

    /// Add a shape and return its index.
    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Image aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Number of emitting shapes.
    pub fn light_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_emissive()).count()
    }

    /// Get total triangle count across all shapes.
    pub fn total_triangle_count(&self) -> usize {
        self.shapes.iter().map(|s| s.mesh.triangle_count()).sum()
    }

    /// Check that the description can be rendered.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples == 0 {
            return Err(SceneError::NoSamples);
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(SceneError::InvalidFov(self.camera.fov));
        }
        for shape in &self.shapes {
            shape
                .mesh
                .validate()
                .map_err(|source| SceneError::InvalidShape {
                    name: shape.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])
    }

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = CameraDesc::default();
        let eye = camera.model.transform_point3(Vec3::ZERO);
        let forward = camera.model.transform_vector3(-Vec3::Z);

        assert!((eye - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_counts() {
        let mut scene = SceneDescription::new("test");
        scene.add_shape(Shape::diffuse("floor", unit_triangle(), Vec3::ONE));
        scene.add_shape(Shape::light(
            "lamp",
            unit_triangle(),
            Emission::new(Vec3::ONE, 4.0),
        ));

        assert_eq!(scene.light_count(), 1);
        assert_eq!(scene.total_triangle_count(), 2);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_shape_name() {
        let mut scene = SceneDescription::new("broken");
        scene.add_shape(Shape::diffuse(
            "bad",
            Mesh::new(vec![Vec3::ZERO], vec![0, 0, 1]),
            Vec3::ONE,
        ));

        match scene.validate() {
            Err(SceneError::InvalidShape { name, .. }) => assert_eq!(name, "bad"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_settings() {
        let mut scene = SceneDescription::new("settings");
        scene.width = 0;
        assert!(matches!(scene.validate(), Err(SceneError::EmptyImage { .. })));

        scene.width = 4;
        scene.samples = 0;
        assert_eq!(scene.validate(), Err(SceneError::NoSamples));

        scene.samples = 1;
        scene.camera.fov = 180.0;
        assert_eq!(scene.validate(), Err(SceneError::InvalidFov(180.0)));
    }

    #[test]
    fn test_vertical_fov() {
        let mut camera = CameraDesc::default();
        camera.fov = 90.0;
        assert_eq!(camera.vertical_fov(0.5), 90.0);

        camera.fov_axis = FovAxis::Shorter;
        assert_eq!(camera.vertical_fov(2.0), 90.0);
        // tan(v/2) = tan(45) / 0.5 = 2
        let portrait = 2.0 * 2.0_f32.atan().to_degrees();
        assert!((camera.vertical_fov(0.5) - portrait).abs() < 1e-3);

        camera.fov_axis = FovAxis::Horizontal;
        // tan(v/2) = tan(45) / 2
        assert!((camera.vertical_fov(2.0) - 2.0 * 0.5_f32.atan().to_degrees()).abs() < 1e-3);

        camera.fov_axis = FovAxis::Larger;
        assert_eq!(camera.vertical_fov(0.5), 90.0);

        camera.fov_axis = FovAxis::Diagonal;
        // Square image: the diagonal is sqrt(2) times the height
        let diagonal = 2.0 * (1.0 / 2.0_f32.sqrt()).atan().to_degrees();
        assert!((camera.vertical_fov(1.0) - diagonal).abs() < 1e-3);
    }

    #[test]
    fn test_integrator_names() {
        assert_eq!(IntegratorKind::from_name("path"), Some(IntegratorKind::Path));
        assert_eq!(IntegratorKind::from_name("normal"), Some(IntegratorKind::Normal));
        assert_eq!(IntegratorKind::from_name("bdpt"), None);
    }
}
