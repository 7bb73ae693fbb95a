//! Flow Renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over brute-force triangle meshes. Scenes come
//! from a [`flow_core::SceneDescription`] via [`Scene::from_description`] or
//! are built by hand.
//!
//! # Example
//!
//! ```ignore
//! use flow_renderer::{render, RenderConfig, Scene};
//!
//! let scene = Scene::from_description(&flow_core::builtin::cornell_box())?;
//! let film = render(&scene, &RenderConfig::default().with_seed(7))?;
//! ```

mod bucket;
mod camera;
mod film;
mod hittable;
mod integrator;
mod material;
mod mesh;
pub mod random;
mod renderer;
pub mod sampling;
mod scene;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::Camera;
pub use film::Film;
pub use hittable::{HitRecord, Hittable, MeshId};
pub use integrator::Integrator;
pub use material::{Color, Material, ScatterRecord};
pub use mesh::Mesh;
pub use renderer::{render, render_pixel, render_with_cancel, RenderConfig, RenderError};
pub use scene::Scene;
pub use triangle::{Triangle, TriangleHit};

/// Re-export Vec3 and common math types from flow_math
pub use flow_math::{Interval, Ray, Transform, Vec3};
