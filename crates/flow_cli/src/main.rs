//! `flow` - render a scene file or a built-in scene to an image.

mod cli;
mod output;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use flow_core::{builtin, load_scene, SceneDescription};
use flow_renderer::{render, Scene};

use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let mut desc = load_description(&args)?;
    args.apply_overrides(&mut desc);

    let scene = Scene::from_description(&desc)
        .with_context(|| format!("scene '{}' cannot be rendered", desc.name))?;
    log::info!(
        "Scene '{}': {} meshes, {} triangles, {} lights",
        desc.name,
        scene.meshes().len(),
        scene.triangle_count(),
        scene.lights().len()
    );

    let start = Instant::now();
    let film = render(&scene, &args.render_config())?;
    log::info!("Total render time {:.2?}", start.elapsed());

    output::save(&film, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(())
}

fn load_description(args: &Args) -> Result<SceneDescription> {
    if let Some(path) = &args.scene {
        return load_scene(path).with_context(|| format!("failed to load {}", path.display()));
    }

    let name = args.builtin.as_deref().unwrap_or("cornell");
    builtin::by_name(name).with_context(|| format!("unknown built-in scene '{name}'"))
}
