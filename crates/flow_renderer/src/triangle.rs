//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use flow_math::{Ray, Vec3};

/// Determinant below which a ray counts as parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Result of a ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit point (may be negative)
    pub t: f32,
    /// Barycentric weight of `v1`
    pub u: f32,
    /// Barycentric weight of `v2`
    pub v: f32,
}

/// Three vertices copied out of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// `t` is returned without a range check; callers decide which
    /// distances count.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some(TriangleHit {
            t: f * edge2.dot(q),
            u,
            v,
        })
    }

    /// Unit geometric normal, following the `v0 v1 v2` winding.
    ///
    /// Zero for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0)
            .cross(self.v2 - self.v0)
            .try_normalize()
            .unwrap_or(Vec3::ZERO)
    }

    pub fn area(&self) -> f32 {
        0.5 * (self.v1 - self.v0).cross(self.v2 - self.v0).length()
    }

    /// Map two uniforms to a uniformly distributed point on the triangle.
    pub fn sample_point(&self, u: f32, v: f32) -> Vec3 {
        let (u, v) = if u + v > 1.0 { (1.0 - u, 1.0 - v) } else { (u, v) };
        self.v0 + (self.v1 - self.v0) * u + (self.v2 - self.v0) * v
    }
}
