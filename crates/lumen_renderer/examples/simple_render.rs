//! Simple path tracer example.
//!
//! Renders the random sphere scene and saves it as a PPM.

use lumen_renderer::{
    color_to_rgb8, random_scene, render, Camera, Hittable, ImageBuffer, ReflectancePolicy, RenderSettings,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Build the scene
    let start = std::time::Instant::now();
    let scene = random_scene(ReflectancePolicy::Schlick, &mut rand::thread_rng());
    println!("Created {} objects in {:?}", scene.world.len(), start.elapsed());

    let settings = RenderSettings::default()
        .with_resolution(800, 450)
        .with_quality(50, 10);
    let camera = Camera::new(&scene.camera, settings.aspect_ratio())?;
    let world: Arc<dyn Hittable> = Arc::new(scene.world);

    let image = render(world, Arc::new(camera), &settings)?;

    let filename = "output.ppm";
    save_ppm(&image, filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for y in 0..image.height {
        for x in 0..image.width {
            let [r, g, b] = color_to_rgb8(image.get(x, y), image.samples_per_pixel);
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
    }

    Ok(())
}
