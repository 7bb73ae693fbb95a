//! Hard-coded reference scenes.

use flow_math::Vec3;

use crate::mesh::Mesh;
use crate::scene::{CameraDesc, Emission, IntegratorKind, SceneDescription, Shape};

/// Names accepted by [`by_name`].
pub const BUILTIN_SCENES: &[&str] = &["cornell", "triangle"];

/// Look up a built-in scene by name.
pub fn by_name(name: &str) -> Option<SceneDescription> {
    match name {
        "cornell" => Some(cornell_box()),
        "triangle" => Some(triangle()),
        _ => None,
    }
}

/// A single white triangle facing the camera, shown with the normal
/// integrator.
pub fn triangle() -> SceneDescription {
    let mut scene = SceneDescription::new("triangle");
    scene.camera = CameraDesc::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y, 45.0);
    scene.integrator = IntegratorKind::Normal;
    scene.samples = 10;
    scene.add_shape(Shape::diffuse(
        "triangle",
        Mesh::new(
            vec![
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
            ],
            vec![0, 1, 2],
        ),
        Vec3::ONE,
    ));
    scene
}

/// The Cornell box, using the measured geometry published by Cornell.
///
/// Walls wind so that their normals point into the box; block faces point
/// out of their block.
pub fn cornell_box() -> SceneDescription {
    let white = Vec3::splat(0.73);
    let red = Vec3::new(0.65, 0.05, 0.05);
    let green = Vec3::new(0.12, 0.45, 0.15);

    let mut scene = SceneDescription::new("cornell");
    scene.camera = CameraDesc::look_at(
        Vec3::new(278.0, 273.0, -800.0),
        Vec3::new(278.0, 273.0, 0.0),
        Vec3::Y,
        40.0,
    );
    scene.max_depth = 5;
    scene.samples = 64;

    scene.add_shape(Shape::diffuse(
        "floor",
        Mesh::quad(
            Vec3::new(552.8, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 559.2),
            Vec3::new(549.6, 0.0, 559.2),
        ),
        white,
    ));
    scene.add_shape(Shape::diffuse(
        "ceiling",
        Mesh::quad(
            Vec3::new(556.0, 548.8, 0.0),
            Vec3::new(556.0, 548.8, 559.2),
            Vec3::new(0.0, 548.8, 559.2),
            Vec3::new(0.0, 548.8, 0.0),
        ),
        white,
    ));
    scene.add_shape(Shape::diffuse(
        "back_wall",
        Mesh::quad(
            Vec3::new(549.6, 0.0, 559.2),
            Vec3::new(0.0, 0.0, 559.2),
            Vec3::new(0.0, 548.8, 559.2),
            Vec3::new(556.0, 548.8, 559.2),
        ),
        white,
    ));
    scene.add_shape(Shape::diffuse(
        "left_wall",
        Mesh::quad(
            Vec3::new(552.8, 0.0, 0.0),
            Vec3::new(549.6, 0.0, 559.2),
            Vec3::new(556.0, 548.8, 559.2),
            Vec3::new(556.0, 548.8, 0.0),
        ),
        red,
    ));
    scene.add_shape(Shape::diffuse(
        "right_wall",
        Mesh::quad(
            Vec3::new(0.0, 0.0, 559.2),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 548.8, 0.0),
            Vec3::new(0.0, 548.8, 559.2),
        ),
        green,
    ));
    scene.add_shape(Shape::diffuse("short_block", short_block(), white));
    scene.add_shape(Shape::diffuse("tall_block", tall_block(), white));
    scene.add_shape(Shape::light(
        "light",
        Mesh::quad(
            Vec3::new(343.0, 548.7, 227.0),
            Vec3::new(343.0, 548.7, 332.0),
            Vec3::new(213.0, 548.7, 332.0),
            Vec3::new(213.0, 548.7, 227.0),
        ),
        Emission::new(Vec3::new(1.0, 0.85, 0.6), 20.0),
    ));
    scene
}

fn short_block() -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(130.0, 165.0, 65.0),
            Vec3::new(82.0, 165.0, 225.0),
            Vec3::new(240.0, 165.0, 272.0),
            Vec3::new(290.0, 165.0, 114.0),
            Vec3::new(290.0, 0.0, 114.0),
            Vec3::new(290.0, 165.0, 114.0),
            Vec3::new(240.0, 165.0, 272.0),
            Vec3::new(240.0, 0.0, 272.0),
            Vec3::new(130.0, 0.0, 65.0),
            Vec3::new(130.0, 165.0, 65.0),
            Vec3::new(290.0, 165.0, 114.0),
            Vec3::new(290.0, 0.0, 114.0),
            Vec3::new(82.0, 0.0, 225.0),
            Vec3::new(82.0, 165.0, 225.0),
            Vec3::new(130.0, 165.0, 65.0),
            Vec3::new(130.0, 0.0, 65.0),
            Vec3::new(240.0, 0.0, 272.0),
            Vec3::new(240.0, 165.0, 272.0),
            Vec3::new(82.0, 165.0, 225.0),
            Vec3::new(82.0, 0.0, 225.0),
        ],
        vec![
            0, 2, 3, 0, 1, 2, 7, 4, 6, 6, 4, 5, 8, 10, 11, 8, 9, 10, 12, 14, 15, 12, 13, 14, 19,
            16, 18, 18, 16, 17,
        ],
    )
}

fn tall_block() -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(423.0, 330.0, 247.0),
            Vec3::new(265.0, 330.0, 296.0),
            Vec3::new(314.0, 330.0, 456.0),
            Vec3::new(472.0, 330.0, 406.0),
            Vec3::new(423.0, 0.0, 247.0),
            Vec3::new(423.0, 330.0, 247.0),
            Vec3::new(472.0, 330.0, 406.0),
            Vec3::new(472.0, 0.0, 406.0),
            Vec3::new(472.0, 0.0, 406.0),
            Vec3::new(472.0, 330.0, 406.0),
            Vec3::new(314.0, 330.0, 456.0),
            Vec3::new(314.0, 0.0, 456.0),
            Vec3::new(314.0, 0.0, 456.0),
            Vec3::new(314.0, 330.0, 456.0),
            Vec3::new(265.0, 330.0, 296.0),
            Vec3::new(265.0, 0.0, 296.0),
            Vec3::new(265.0, 0.0, 296.0),
            Vec3::new(265.0, 330.0, 296.0),
            Vec3::new(423.0, 330.0, 247.0),
            Vec3::new(423.0, 0.0, 247.0),
        ],
        vec![
            3, 0, 2, 2, 0, 1, 4, 6, 7, 4, 5, 6, 11, 8, 10, 10, 8, 9, 15, 12, 14, 14, 12, 13, 16,
            18, 19, 16, 17, 18,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for name in BUILTIN_SCENES {
            let scene = by_name(name).expect("listed scene exists");
            assert!(scene.validate().is_ok(), "{name} failed validation");
        }
        assert!(by_name("sponza").is_none());
    }

    #[test]
    fn test_cornell_has_one_light() {
        let scene = cornell_box();
        assert_eq!(scene.light_count(), 1);
        assert_eq!(scene.total_triangle_count(), 6 * 2 + 2 * 10);
    }

    #[test]
    fn test_cornell_walls_face_inward() {
        let scene = cornell_box();
        let center = Vec3::new(278.0, 274.0, 279.6);

        for shape in scene.shapes.iter().filter(|s| !s.name.ends_with("block")) {
            let p = &shape.mesh.positions;
            let normal = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(
                normal.dot(center - p[0]) > 0.0,
                "{} faces away from the box interior",
                shape.name
            );
        }
    }

    #[test]
    fn test_cornell_blocks_face_outward() {
        let scene = cornell_box();
        let blocks: Vec<_> = scene.shapes.iter().filter(|s| s.name.ends_with("block")).collect();
        assert_eq!(blocks.len(), 2);

        for block in blocks {
            let p = &block.mesh.positions;
            let centroid = p.iter().copied().sum::<Vec3>() / p.len() as f32;
            for tri in block.mesh.indices.chunks(3) {
                let [a, b, c] = [0, 1, 2].map(|i| p[tri[i] as usize]);
                let normal = (b - a).cross(c - a);
                assert!(
                    normal.dot(a - centroid) > 0.0,
                    "{} triangle {:?} faces into the block",
                    block.name,
                    tri
                );
            }
        }
    }
}
