//! Random sampling helpers.
//!
//! Everything here draws from a caller-supplied generator. Render workers
//! pass their own `rand::thread_rng()`, so generator state is per thread
//! and never shared; tests pass a seeded `StdRng`.

use crate::Color;
use lumen_math::Vec3;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

/// Uniform f32 in [min, max).
#[inline]
pub fn gen_range_f32(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Standard normal f32 (mean 0, variance 1).
#[inline]
pub fn gen_normal_f32(rng: &mut dyn RngCore) -> f32 {
    rng.sample(StandardNormal)
}

/// Uniformly distributed direction on the unit sphere.
///
/// Built from three independent standard normals, which is rotation
/// invariant and needs no rejection loop.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let mut v = Vec3::new(gen_normal_f32(rng), gen_normal_f32(rng), gen_normal_f32(rng));
    if v == Vec3::ZERO {
        v.x = 1.0;
    }
    v.normalize()
}

/// Uniform point inside the unit sphere (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform point inside the unit disk on the XY plane (rejection sampling).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range_f32(rng, -1.0, 1.0), gen_range_f32(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Random color with channels in [0, 1).
pub fn random_color(rng: &mut dyn RngCore) -> Color {
    Color::new(gen_f32(rng), gen_f32(rng), gen_f32(rng))
}

/// Random color with channels in [min, max).
pub fn random_color_range(rng: &mut dyn RngCore, min: f32, max: f32) -> Color {
    Color::new(
        gen_range_f32(rng, min, max),
        gen_range_f32(rng, min, max),
        gen_range_f32(rng, min, max),
    )
}
