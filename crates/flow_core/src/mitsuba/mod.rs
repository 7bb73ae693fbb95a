//! Mitsuba 3 XML scene support.
//!
//! Reads the part of the Mitsuba scene format used by Cornell-box style
//! scenes: `<default>` parameters with `$name` references, a perspective
//! `<sensor>`, diffuse BSDFs (optionally `twosided`) and `rectangle` and
//! `cube` shapes with area emitters.
//!
//! ## Not Supported
//!
//! - `<include>` and mesh files (`obj`, `ply`, `serialized`)
//! - Non-diffuse BSDFs (read as diffuse with a warning)
//! - Emitters other than `area` on a shape
//! - Textured reflectance
//!
//! # Example
//!
//! ```ignore
//! use flow_core::mitsuba::load_mitsuba;
//!
//! let scene = load_mitsuba("cbox.xml")?;
//! println!("{} shapes, {} lights", scene.shapes.len(), scene.light_count());
//! ```

mod error;
mod parser;
mod values;

use std::path::Path;

use roxmltree::Document;

pub use error::*;
pub use parser::{MitsubaContext, UNBOUNDED_DEPTH};
pub use values::{parse_array, parse_floats, split_values};

use crate::load::{scene_name, LoadResult};
use crate::scene::SceneDescription;

/// Parse Mitsuba XML source into a scene description.
///
/// The result is not validated; [`load_mitsuba`] does that.
pub fn parse_mitsuba(source: &str, name: &str) -> MitsubaResult<SceneDescription> {
    let doc = Document::parse(source)?;
    let mut ctx = MitsubaContext::new(name);
    ctx.parse_document(&doc)?;
    Ok(ctx.finish())
}

/// Load and validate a Mitsuba XML scene file. The scene is named after the
/// file stem.
pub fn load_mitsuba<P: AsRef<Path>>(path: P) -> LoadResult<SceneDescription> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let scene = parse_mitsuba(&source, scene_name(path))?;
    scene.validate()?;

    log::info!(
        "Loaded '{}': {} shapes ({} lights), {} triangles",
        scene.name,
        scene.shapes.len(),
        scene.light_count(),
        scene.total_triangle_count()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::LoadError;

    #[test]
    fn test_load_missing_file() {
        let result = load_mitsuba("/nonexistent/scene.xml");
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let _ = env_logger::builder().is_test(true).try_init();

        let path = std::env::temp_dir().join(format!("flow_load_{}.xml", std::process::id()));
        std::fs::write(
            &path,
            r#"<scene version="3.0.0">
                <sensor type="perspective">
                    <float name="fov" value="45"/>
                    <film type="hdrfilm">
                        <integer name="width" value="8"/>
                        <integer name="height" value="6"/>
                    </film>
                </sensor>
                <shape type="rectangle">
                    <emitter type="area"><rgb name="radiance" value="4"/></emitter>
                </shape>
            </scene>"#,
        )
        .unwrap();

        let scene = load_mitsuba(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(scene.name.starts_with("flow_load_"));
        assert_eq!((scene.width, scene.height), (8, 6));
        assert_eq!(scene.light_count(), 1);
        assert_eq!(scene.total_triangle_count(), 2);
    }

    #[test]
    fn test_load_rejects_invalid_settings() {
        let path = std::env::temp_dir().join(format!("flow_invalid_{}.xml", std::process::id()));
        std::fs::write(
            &path,
            r#"<scene version="3.0.0"><sensor type="perspective">
                <float name="fov" value="45"/>
                <sampler type="independent"><integer name="sample_count" value="0"/></sampler>
            </sensor></scene>"#,
        )
        .unwrap();

        let result = load_mitsuba(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(LoadError::Scene(_))));
    }

    #[test]
    fn test_parse_error_is_wrapped() {
        let path = std::env::temp_dir().join(format!("flow_broken_{}.xml", std::process::id()));
        std::fs::write(&path, "<scene><shape></scene>").unwrap();

        let result = load_mitsuba(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(LoadError::Mitsuba(MitsubaError::Xml(_)))));
    }
}
