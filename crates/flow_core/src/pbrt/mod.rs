//! pbrt-style scene file support.
//!
//! Reads the subset of the pbrt-v4 text format that maps onto Flow's scene
//! model: triangle meshes, diffuse materials, diffuse area lights and a
//! perspective camera.
//!
//! ## Not Supported
//!
//! - `Include` / `Import`
//! - Textures, non-diffuse materials (read as diffuse with a warning)
//! - Analytic shapes (`sphere`, `disk`, ...) and PLY meshes
//! - Point, spot and infinite lights
//!
//! # Example
//!
//! ```ignore
//! use flow_core::pbrt::load_pbrt;
//!
//! let scene = load_pbrt("cornell-box.pbrt")?;
//! println!("{} shapes, {} lights", scene.shapes.len(), scene.light_count());
//! ```

mod error;
mod parser;
mod tokenizer;

use std::path::Path;

pub use error::*;
pub use parser::{Parser, ParserContext};
pub use tokenizer::{tokenize, Spanned, Token};

use crate::load::{scene_name, LoadResult};
use crate::scene::SceneDescription;

/// Parse pbrt source text into a scene description.
///
/// The result is not validated; [`load_pbrt`] does that.
pub fn parse_pbrt(source: &str, name: &str) -> ParseResult<SceneDescription> {
    let tokens = tokenize(source)?;
    let mut ctx = ParserContext::new(name);
    Parser::new(&tokens).parse(&mut ctx)?;
    ctx.finish()
}

/// Load and validate a pbrt scene file. The scene is named after the file
/// stem.
pub fn load_pbrt<P: AsRef<Path>>(path: P) -> LoadResult<SceneDescription> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let scene = parse_pbrt(&source, scene_name(path))?;
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
