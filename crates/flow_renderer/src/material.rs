//! Surface materials.
//!
//! The material set is closed, so materials are a plain enum and every
//! operation is a `match`.

use flow_core::{Emission, MaterialDesc};
use flow_math::Vec3;
use rand::RngCore;

use crate::random::gen_f32;
use crate::sampling::{sample_hemisphere_cosine, sample_hemisphere_cosine_pdf, Onb};

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// A sampled continuation of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRecord {
    /// World-space direction of the scattered ray
    pub direction: Vec3,
    /// Color the scattered radiance is multiplied by
    pub attenuation: Color,
    /// Delta distribution (no material sets this yet)
    pub specular: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { color: Color },
    /// Emitter that absorbs everything it receives.
    DiffuseLight { color: Color, intensity: f32 },
}

impl Material {
    pub fn lambertian(color: Color) -> Self {
        Material::Lambertian { color }
    }

    pub fn diffuse_light(color: Color, intensity: f32) -> Self {
        Material::DiffuseLight { color, intensity }
    }

    /// Material for a described shape. Emission wins over reflectance.
    pub fn from_description(material: &MaterialDesc, emission: Option<&Emission>) -> Self {
        match (material, emission) {
            (_, Some(emission)) => Material::diffuse_light(emission.radiance, emission.scale),
            (MaterialDesc::Diffuse { reflectance }, None) => Material::lambertian(*reflectance),
        }
    }

    /// Radiance emitted from the surface.
    pub fn emit(&self) -> Color {
        match *self {
            Material::Lambertian { .. } => Color::ZERO,
            Material::DiffuseLight { color, intensity } => color * intensity,
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Material::DiffuseLight { .. })
    }

    /// Sample an incoming direction at a surface with (ray-facing) normal `n`.
    pub fn sample(&self, _wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        match *self {
            Material::Lambertian { color } => {
                let local = sample_hemisphere_cosine(gen_f32(rng), gen_f32(rng));
                Some(ScatterRecord {
                    direction: Onb::from_normal(n).to_world(local),
                    attenuation: color,
                    specular: false,
                })
            }
            Material::DiffuseLight { .. } => None,
        }
    }

    /// Density with which [`Material::sample`] picks `wi`.
    pub fn pdf(&self, _wo: Vec3, n: Vec3, wi: Vec3) -> f32 {
        match self {
            Material::Lambertian { .. } => sample_hemisphere_cosine_pdf(n, wi),
            Material::DiffuseLight { .. } => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_emit() {
        assert_eq!(Material::lambertian(Color::ONE).emit(), Color::ZERO);
        assert_eq!(
            Material::diffuse_light(Color::new(1.0, 0.5, 0.25), 4.0).emit(),
            Color::new(4.0, 2.0, 1.0)
        );
    }

    #[test]
    fn test_lambertian_scatters_into_hemisphere() {
        let material = Material::lambertian(Color::splat(0.5));
        let n = Vec3::new(0.0, 1.0, 1.0).normalize();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let scatter = material.sample(-n, n, &mut rng).expect("diffuse scatters");
            assert!(scatter.direction.dot(n) >= -1e-5);
            assert!((scatter.direction.length() - 1.0).abs() < 1e-4);
            assert_eq!(scatter.attenuation, Color::splat(0.5));
            assert!(!scatter.specular);
            assert!(material.pdf(-n, n, scatter.direction) >= 0.0);
        }
    }

    #[test]
    fn test_light_does_not_scatter() {
        let light = Material::diffuse_light(Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(42);

        assert!(light.is_light());
        assert!(light.sample(-Vec3::Y, Vec3::Y, &mut rng).is_none());
        assert_eq!(light.pdf(-Vec3::Y, Vec3::Y, Vec3::Y), 0.0);
    }

    #[test]
    fn test_lambertian_pdf() {
        let material = Material::lambertian(Color::ONE);
        let pdf = material.pdf(Vec3::Z, Vec3::Z, Vec3::Z);
        assert!((pdf - std::f32::consts::FRAC_1_PI).abs() < 1e-6);
        assert_eq!(material.pdf(Vec3::Z, Vec3::Z, -Vec3::Z), 0.0);
    }

    #[test]
    fn test_from_description() {
        let desc = MaterialDesc::Diffuse {
            reflectance: Color::splat(0.2),
        };
        assert_eq!(
            Material::from_description(&desc, None),
            Material::lambertian(Color::splat(0.2))
        );

        let emission = Emission::new(Color::ONE, 3.0);
        assert_eq!(
            Material::from_description(&desc, Some(&emission)),
            Material::diffuse_light(Color::ONE, 3.0)
        );
    }
}
