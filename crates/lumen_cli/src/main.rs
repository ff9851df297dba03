use anyhow::{Context, Result};
use clap::Parser;
use lumen_renderer::{load_scene, render, write_image, Camera, Hittable};
use std::sync::Arc;

mod cli;

use cli::Args;

fn init_logger(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = args.log_level {
        builder.filter_level(level.into());
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args);

    log::info!("Lumen {}", env!("CARGO_PKG_VERSION"));

    let settings = args.render_settings();
    let scene = load_scene(&args.scene, args.reflectance_override(), &mut rand::thread_rng())
        .with_context(|| format!("Failed to load scene '{}'", args.scene))?;

    let camera = Camera::new(&scene.camera, settings.aspect_ratio()).context("Invalid camera settings")?;
    let world: Arc<dyn Hittable> = Arc::new(scene.world);

    let image = render(world, Arc::new(camera), &settings).context("Render failed")?;

    write_image(&image, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!("Done.");
    Ok(())
}
