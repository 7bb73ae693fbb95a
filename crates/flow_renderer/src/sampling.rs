//! Hemisphere sampling.
//!
//! Sample functions take two uniforms in `[0, 1)` and return a unit
//! direction in a local frame whose pole is +Z. [`Onb`] moves them into
//! world space around a surface normal.

use std::f32::consts::{FRAC_1_PI, TAU};

use flow_math::Vec3;

/// Uniformly distributed direction on the +Z hemisphere.
pub fn sample_hemisphere_uniform(u1: f32, u2: f32) -> Vec3 {
    let phi = TAU * u1;
    let cos_theta = u2;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta).normalize()
}

/// Density of [`sample_hemisphere_uniform`] for `direction` around `normal`.
pub fn sample_hemisphere_uniform_pdf(normal: Vec3, direction: Vec3) -> f32 {
    if normal.dot(direction) > 0.0 {
        0.5 * FRAC_1_PI
    } else {
        0.0
    }
}

/// Cosine-weighted direction on the +Z hemisphere.
pub fn sample_hemisphere_cosine(u1: f32, u2: f32) -> Vec3 {
    let phi = TAU * u1;
    let cos_theta = u2.sqrt();
    let sin_theta = (1.0 - u2).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta).normalize()
}

/// Density of [`sample_hemisphere_cosine`] for `direction` around `normal`.
pub fn sample_hemisphere_cosine_pdf(normal: Vec3, direction: Vec3) -> f32 {
    normal.dot(direction).max(0.0) * FRAC_1_PI
}

/// Orthonormal basis around a normal.
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub n: Vec3,
}

impl Onb {
    /// Build a basis around the unit vector `n`.
    pub fn from_normal(n: Vec3) -> Self {
        let helper = if n.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = n.cross(helper).normalize();
        let u = n.cross(v).normalize();
        Self { u, v, n }
    }

    /// Map a local direction (pole on +Z) into world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.u * local.x + self.v * local.y + self.n * local.z
    }
}
