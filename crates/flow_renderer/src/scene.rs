//! The renderer's scene: a mesh arena plus render settings.

use flow_core::{SceneDescription, SceneError};
use flow_math::{Interval, Ray, Vec3};

use crate::camera::Camera;
use crate::hittable::{HitRecord, Hittable, MeshId};
use crate::integrator::Integrator;
use crate::material::Material;
use crate::mesh::Mesh;

/// Everything a render needs. Read-only while rendering.
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<Mesh>,
    lights: Vec<MeshId>,
    pub camera: Camera,
    pub integrator: Integrator,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Maximum number of path segments
    pub bounces: u32,
    /// Samples per pixel
    pub samples: u32,
}

impl Scene {
    /// Empty scene with path tracing, 16 samples and 5 bounces.
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        Self {
            meshes: Vec::new(),
            lights: Vec::new(),
            camera,
            integrator: Integrator::Path,
            width,
            height,
            bounces: 5,
            samples: 16,
        }
    }

    /// Set the integrator.
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, bounces: u32) -> Self {
        self.samples = samples;
        self.bounces = bounces;
        self
    }

    /// Build a scene from a validated description.
    pub fn from_description(desc: &SceneDescription) -> Result<Self, SceneError> {
        desc.validate()?;

        let camera = Camera::from_description(&desc.camera, desc.aspect());
        let mut scene = Scene::new(camera, desc.width, desc.height)
            .with_integrator(Integrator::from(desc.integrator))
            .with_quality(desc.samples, desc.max_depth);

        for shape in &desc.shapes {
            let material = Material::from_description(&shape.material, shape.emission.as_ref());
            let mesh = Mesh::new(shape.mesh.positions.clone(), shape.mesh.indices.clone(), material)
                .map_err(|source| SceneError::InvalidShape {
                    name: shape.name.clone(),
                    source,
                })?;
            scene.add(mesh);
        }

        log::debug!(
            "Scene '{}': {} meshes, {} lights",
            desc.name,
            scene.meshes.len(),
            scene.lights.len()
        );
        Ok(scene)
    }

    /// Add a mesh and return its id. Emissive meshes with area become
    /// lights.
    pub fn add(&mut self, mut mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len());
        mesh.id = id;
        if mesh.material().is_light() && mesh.area() > 0.0 {
            self.lights.push(id);
        }
        self.meshes.push(mesh);
        id
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Ids of the emissive meshes, in insertion order.
    pub fn lights(&self) -> &[MeshId] {
        &self.lights
    }

    /// Density of choosing `direction` from `origin` by picking a light
    /// uniformly and sampling a point on it.
    pub fn light_pdf(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.lights.is_empty() {
            return 0.0;
        }
        let sum: f32 = self
            .lights
            .iter()
            .map(|&id| self.mesh(id).pdf(origin, direction))
            .sum();
        sum / self.lights.len() as f32
    }

    /// Get total triangle count across all meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest = None;
        let mut window = ray_t;

        for mesh in &self.meshes {
            if let Some(rec) = mesh.hit(ray, window) {
                window = window.with_max(rec.t);
                closest = Some(rec);
            }
        }

        closest
    }

    fn hit_p(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let mut closest = None;
        let mut window = ray_t;

        for mesh in &self.meshes {
            if let Some(t) = mesh.hit_p(ray, window) {
                window = window.with_max(t);
                closest = Some(t);
            }
        }

        closest
    }
}
