//! Light transport integrators.
//!
//! [`Integrator::Path`] is a unidirectional path tracer. At every diffuse
//! bounce it picks the next direction either from the material or toward a
//! random point on a light (probability [`LIGHT_SAMPLE_PROBABILITY`]) and
//! weights the bounce by the mixture density of both strategies.

use flow_core::IntegratorKind;
use flow_math::{Interval, Ray};
use rand::RngCore;

use crate::hittable::Hittable;
use crate::material::Color;
use crate::random::{gen_f32, gen_index};
use crate::scene::Scene;

/// Nearest distance a path segment may hit.
pub const T_MIN: f32 = 1e-3;

/// Offset along the normal for continuation rays.
pub const RAY_OFFSET: f32 = 1e-4;

/// Chance of steering a bounce toward a light.
pub const LIGHT_SAMPLE_PROBABILITY: f32 = 0.5;

/// Mixture densities below this end the path.
pub const MIN_PDF: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Integrator {
    /// Shows the ray-facing surface normal at the first hit.
    Normal,
    /// Path tracing with light sampling.
    #[default]
    Path,
}

impl From<IntegratorKind> for Integrator {
    fn from(kind: IntegratorKind) -> Self {
        match kind {
            IntegratorKind::Normal => Integrator::Normal,
            IntegratorKind::Path => Integrator::Path,
        }
    }
}

impl Integrator {
    /// Radiance arriving along `ray`. Non-finite estimates are returned as
    /// black.
    pub fn li(&self, ray: &Ray, scene: &Scene, rng: &mut dyn RngCore) -> Color {
        let radiance = match self {
            Integrator::Normal => normal(ray, scene),
            Integrator::Path => path(ray, scene, rng),
        };

        if radiance.is_finite() {
            radiance
        } else {
            log::trace!("Dropping non-finite sample {:?}", radiance);
            Color::ZERO
        }
    }
}

fn normal(ray: &Ray, scene: &Scene) -> Color {
    scene
        .hit(ray, Interval::new(T_MIN, f32::INFINITY))
        .map_or(Color::ZERO, |rec| rec.normal)
}

fn path(ray: &Ray, scene: &Scene, rng: &mut dyn RngCore) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;
    let lights = scene.lights();

    for _ in 0..scene.bounces {
        let Some(rec) = scene.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            break;
        };
        let material = scene.mesh(rec.mesh).material();
        let wo = -ray.direction();

        radiance += throughput * material.emit();
        if rec.inside {
            break;
        }

        let Some(scatter) = material.sample(wo, rec.normal, rng) else {
            break;
        };

        let mut direction = scatter.direction;
        if !lights.is_empty() && gen_f32(rng) < LIGHT_SAMPLE_PROBABILITY {
            let light = scene.mesh(lights[gen_index(rng, lights.len())]);
            if let Some(to_light) = light
                .sample_point(rng)
                .and_then(|point| (point - rec.p).try_normalize())
            {
                direction = to_light;
            }
        }

        let material_pdf = material.pdf(wo, rec.normal, direction);
        let pdf = if lights.is_empty() {
            material_pdf
        } else {
            (1.0 - LIGHT_SAMPLE_PROBABILITY) * material_pdf
                + LIGHT_SAMPLE_PROBABILITY * scene.light_pdf(rec.p, direction)
        };
        if pdf < MIN_PDF {
            break;
        }

        throughput *= scatter.attenuation * material_pdf / pdf;
        ray = Ray::new(rec.p + rec.normal * RAY_OFFSET, direction);
    }

    radiance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::material::Material;
    use crate::mesh::Mesh;
    use flow_math::{Transform, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quad(z: f32, size: f32, material: Material) -> Mesh {
        // Faces +Z
        Mesh::new(
            vec![
                Vec3::new(-size, -size, z),
                Vec3::new(size, -size, z),
                Vec3::new(size, size, z),
                Vec3::new(-size, size, z),
            ],
            vec![0, 1, 2, 2, 3, 0],
            material,
        )
        .unwrap()
    }

    fn flipped_quad(z: f32, size: f32, material: Material) -> Mesh {
        // Faces -Z
        Mesh::new(
            vec![
                Vec3::new(-size, -size, z),
                Vec3::new(-size, size, z),
                Vec3::new(size, size, z),
                Vec3::new(size, -size, z),
            ],
            vec![0, 1, 2, 2, 3, 0],
            material,
        )
        .unwrap()
    }

    fn scene() -> Scene {
        Scene::new(Camera::new(Transform::IDENTITY, 45.0, 1.0), 4, 4)
    }

    #[test]
    fn test_normal_integrator() {
        let mut scene = scene();
        scene.add(quad(-2.0, 1.0, Material::lambertian(Vec3::ONE)));
        let mut rng = StdRng::seed_from_u64(1);

        let hit = Integrator::Normal.li(&Ray::new(Vec3::ZERO, -Vec3::Z), &scene, &mut rng);
        assert_eq!(hit, Vec3::Z);

        let miss = Integrator::Normal.li(&Ray::new(Vec3::ZERO, Vec3::Z), &scene, &mut rng);
        assert_eq!(miss, Color::ZERO);
    }

    #[test]
    fn test_direct_view_of_light() {
        let mut scene = scene();
        scene.add(quad(-2.0, 1.0, Material::diffuse_light(Vec3::new(1.0, 0.5, 0.25), 2.0)));
        let mut rng = StdRng::seed_from_u64(1);

        let radiance = Integrator::Path.li(&Ray::new(Vec3::ZERO, -Vec3::Z), &scene, &mut rng);
        assert_eq!(radiance, Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn test_back_face_stops_after_emission() {
        let mut scene = scene();
        scene.add(flipped_quad(-2.0, 1.0, Material::lambertian(Vec3::ONE)));
        scene.add(quad(1.0, 5.0, Material::diffuse_light(Vec3::ONE, 1.0)));
        let mut rng = StdRng::seed_from_u64(1);

        // Hits the diffuse quad from behind; nothing is emitted there
        let radiance = Integrator::Path.li(&Ray::new(Vec3::ZERO, -Vec3::Z), &scene, &mut rng);
        assert_eq!(radiance, Color::ZERO);
    }

    #[test]
    fn test_zero_bounces_is_black() {
        let mut scene = scene().with_quality(1, 0);
        scene.add(quad(-2.0, 1.0, Material::diffuse_light(Vec3::ONE, 1.0)));
        let mut rng = StdRng::seed_from_u64(1);

        let radiance = Integrator::Path.li(&Ray::new(Vec3::ZERO, -Vec3::Z), &scene, &mut rng);
        assert_eq!(radiance, Color::ZERO);
    }

    #[test]
    fn test_lit_floor_is_finite_and_positive() {
        // Diffuse floor at z=-2 facing +Z, light overhead at z=0 facing -Z
        let mut scene = scene().with_quality(1, 4);
        scene.add(quad(-2.0, 10.0, Material::lambertian(Vec3::splat(0.8))));
        scene.add(flipped_quad(0.0, 0.5, Material::diffuse_light(Vec3::ONE, 10.0)));
        let mut rng = StdRng::seed_from_u64(3);

        let origin = Vec3::new(3.0, 0.0, -1.0);
        let mut total = Color::ZERO;
        for i in 0..2000 {
            let target = Vec3::new((i % 7) as f32 * 0.3, (i % 5) as f32 * 0.3, -2.0);
            let ray = Ray::new(origin, target - origin);
            let radiance = Integrator::Path.li(&ray, &scene, &mut rng);
            assert!(radiance.is_finite());
            assert!(radiance.min_element() >= 0.0, "negative radiance {radiance:?}");
            total += radiance;
        }
        assert!(total.max_element() > 0.0);
    }

    #[test]
    fn test_without_lights_uses_material_pdf() {
        let mut scene = scene().with_quality(1, 3);
        scene.add(quad(-2.0, 10.0, Material::lambertian(Vec3::splat(0.5))));
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let radiance = Integrator::Path.li(&Ray::new(Vec3::ZERO, -Vec3::Z), &scene, &mut rng);
            assert_eq!(radiance, Color::ZERO);
        }
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(Integrator::from(IntegratorKind::Normal), Integrator::Normal);
        assert_eq!(Integrator::from(IntegratorKind::Path), Integrator::Path);
    }
}
