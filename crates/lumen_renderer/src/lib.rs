//! Lumen - multithreaded CPU path tracing.
//!
//! A Monte Carlo path tracer for sphere scenes. Each image scanline is
//! an independent job on a fixed worker pool; jobs write disjoint rows
//! of a shared accumulation buffer, and the scene and camera are
//! immutable while rendering, so no locks are taken on the hot path.

mod buffer;
mod camera;
mod hittable;
mod material;
mod output;
mod renderer;
mod scene;
mod settings;
mod sphere;
mod thread_pool;

pub mod random;

pub use buffer::{AccumulationBuffer, BufferError, ImageBuffer};
pub use camera::Camera;
pub use hittable::{face_normal, HitRecord, Hittable, HittableList, Primitive};
pub use material::{
    reflect, refract, Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, ReflectancePolicy, Scatter,
    ScatterResult,
};
pub use output::{color_to_rgb8, linear_to_gamma, to_rgb_image, write_image, OutputError};
pub use renderer::{ray_color, render, render_pixel, render_scanline, sky_gradient, RenderError, T_MIN};
pub use scene::{
    load_scene, random_scene, single_sphere_scene, small_scene, BuiltinScene, MaterialDescription, Scene,
    SceneDescription, SceneError, SphereDescription,
};
pub use settings::{CameraSettings, ConfigError, RenderSettings};
pub use sphere::Sphere;
pub use thread_pool::{hardware_concurrency, Job, ThreadPool};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};
