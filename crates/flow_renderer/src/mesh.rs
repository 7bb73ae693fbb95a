//! Intersectable triangle meshes.

use std::sync::Arc;

use flow_core::mesh::{validate_indices, MeshError};
use flow_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, MeshId};
use crate::material::Material;
use crate::random::{gen_f32, gen_index};
use crate::triangle::Triangle;

/// Minimum distance for the light pdf ray.
const PDF_T_MIN: f32 = 1e-4;

/// Cosines below this make a light direction count as grazing.
const PDF_COS_EPSILON: f32 = 1e-4;

/// An indexed triangle mesh with a single material.
///
/// Vertex positions are shared, so cloning a mesh is cheap.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) id: MeshId,
    positions: Arc<[Vec3]>,
    indices: Vec<u32>,
    material: Material,
    area: f32,
}

impl Mesh {
    /// Create a mesh, checking every index against the vertex buffer.
    pub fn new(
        positions: impl Into<Arc<[Vec3]>>,
        indices: Vec<u32>,
        material: Material,
    ) -> Result<Self, MeshError> {
        let positions = positions.into();
        validate_indices(&indices, positions.len())?;

        let mut mesh = Self {
            id: MeshId::default(),
            positions,
            indices,
            material,
            area: 0.0,
        };
        mesh.area = mesh.triangles().map(|tri| tri.area()).sum();
        Ok(mesh)
    }

    /// Id assigned by the scene the mesh was added to.
    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Total surface area, computed at construction.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// The `index`-th triangle.
    pub fn triangle(&self, index: usize) -> Triangle {
        let i = &self.indices[index * 3..index * 3 + 3];
        Triangle::new(
            self.positions[i[0] as usize],
            self.positions[i[1] as usize],
            self.positions[i[2] as usize],
        )
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    /// Pick a point on the surface: a triangle uniformly by index, then a
    /// uniform point inside it.
    ///
    /// Triangles are not weighted by area, so meshes with unequal triangles
    /// are sampled with a bias.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Option<Vec3> {
        if self.triangle_count() == 0 {
            return None;
        }
        let tri = self.triangle(gen_index(rng, self.triangle_count()));
        let v = gen_f32(rng);
        let u = gen_f32(rng);
        Some(tri.sample_point(u, v))
    }

    /// Solid angle density of reaching this mesh from `origin` in `direction`
    /// by area sampling. Zero on a miss, at grazing angles, or for meshes
    /// without area.
    pub fn pdf(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.area <= 0.0 {
            return 0.0;
        }
        let ray = Ray::new(origin, direction);
        let Some(rec) = self.hit(&ray, Interval::new(PDF_T_MIN, f32::INFINITY)) else {
            return 0.0;
        };

        let cosine = (-ray.direction()).dot(rec.normal).max(0.0);
        if cosine < PDF_COS_EPSILON {
            return 0.0;
        }
        rec.t * rec.t / (cosine * self.area)
    }
}

impl Hittable for Mesh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<(f32, Triangle)> = None;
        let mut window = ray_t;

        for tri in self.triangles() {
            if let Some(hit) = tri.intersect(ray) {
                if window.surrounds(hit.t) {
                    window = window.with_max(hit.t);
                    closest = Some((hit.t, tri));
                }
            }
        }

        closest.map(|(t, tri)| HitRecord::new(ray, t, tri.normal(), self.id))
    }

    fn hit_p(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let mut closest = None;
        let mut window = ray_t;

        for tri in self.triangles() {
            if let Some(hit) = tri.intersect(ray) {
                if window.surrounds(hit.t) {
                    window = window.with_max(hit.t);
                    closest = Some(hit.t);
                }
            }
        }

        closest
    }
}
