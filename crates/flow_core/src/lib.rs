//! Flow Core - scene description and loading.
//!
//! This crate provides:
//!
//! - **Scene description types**: `SceneDescription`, `Shape`, `Mesh`,
//!   `CameraDesc`
//! - **Scene loading**: pbrt-style text files and Mitsuba XML, picked by
//!   file extension
//! - **Built-in scenes**: the Cornell box and a single test triangle
//!
//! # Example
//!
//! ```ignore
//! use flow_core::load_scene;
//!
//! let scene = load_scene("scene.pbrt")?;
//! println!("Loaded {} shapes, {} triangles",
//!     scene.shapes.len(),
//!     scene.total_triangle_count());
//! ```

pub mod builtin;
pub mod load;
pub mod mesh;
pub mod mitsuba;
pub mod pbrt;
pub mod scene;

// Re-export commonly used types
pub use load::{load_scene, LoadError, LoadResult, SceneFormat};
pub use mesh::{Mesh, MeshError};
pub use mitsuba::{load_mitsuba, parse_mitsuba};
pub use pbrt::{load_pbrt, parse_pbrt};
pub use scene::{
    CameraDesc, Emission, FovAxis, IntegratorKind, MaterialDesc, SceneDescription, SceneError,
    Shape,
};
