//! Hittable trait and HitRecord for ray-object intersection.

use flow_math::{Interval, Ray, Vec3};

/// Index of a mesh in its [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the normal was flipped, i.e. the ray hit the back face
    pub inside: bool,
    /// Mesh that was hit
    pub mesh: MeshId,
}

impl HitRecord {
    /// Build a record for a hit at `t`, orienting `outward_normal` against
    /// the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, mesh: MeshId) -> Self {
        let inside = ray.direction().dot(outward_normal) > 0.0;
        Self {
            p: ray.at(t),
            normal: if inside { -outward_normal } else { outward_normal },
            t,
            inside,
            mesh,
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest hit with `t` strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// Distance to the nearest hit strictly inside `ray_t`, for occlusion
    /// queries.
    fn hit_p(&self, ray: &Ray, ray_t: Interval) -> Option<f32>;
}
