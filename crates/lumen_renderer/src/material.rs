//! Materials describing how light interacts with surfaces.

use crate::hittable::HitRecord;
use crate::random::{gen_f32, random_in_unit_sphere, random_unit_vector};
use lumen_math::{NearZero, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Result of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Multiplicative color applied to light returning along `scattered`
    pub attenuation: Color,
    /// The continuation ray
    pub scattered: Ray,
}

impl ScatterResult {
    fn new(attenuation: Color, scattered: Ray) -> Self {
        Self {
            attenuation,
            scattered,
        }
    }
}

/// Capability shared by every material variant.
pub trait Scatter {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Emitters end a path instead of bouncing.
    fn is_light(&self) -> bool {
        false
    }
}

/// How a dielectric chooses between reflection and refraction when
/// refraction is physically possible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectancePolicy {
    /// Always refract unless total internal reflection forces a mirror bounce.
    #[default]
    Deterministic,
    /// Reflect with the probability given by Schlick's approximation.
    Schlick,
}

/// The closed set of materials. Scene objects share these through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    Light(DiffuseLight),
}

impl Scatter for Material {
    #[inline]
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
            Material::Light(m) => m.scatter(ray_in, rec, rng),
        }
    }

    #[inline]
    fn is_light(&self) -> bool {
        match self {
            Material::Lambertian(m) => m.is_light(),
            Material::Metal(m) => m.is_light(),
            Material::Dielectric(m) => m.is_light(),
            Material::Light(m) => m.is_light(),
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<DiffuseLight> for Material {
    fn from(m: DiffuseLight) -> Self {
        Material::Light(m)
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Scatter for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // Point on the unit sphere tangent to the surface at the hit point
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult::new(self.albedo, Ray::new(rec.p, scatter_direction)))
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Scatter for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz can push the ray below the surface; absorb it then
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult::new(self.albedo, Ray::new(rec.p, scattered_dir)))
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
    policy: ReflectancePolicy,
}

impl Dielectric {
    /// Create a new Dielectric material that refracts whenever it can.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self::with_policy(ior, ReflectancePolicy::Deterministic)
    }

    /// Create a new Dielectric material with an explicit reflectance policy.
    pub fn with_policy(ior: f32, policy: ReflectancePolicy) -> Self {
        Self { ior, policy }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    pub fn policy(&self) -> ReflectancePolicy {
        self.policy
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Scatter for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let reflects = cannot_refract
            || match self.policy {
                ReflectancePolicy::Deterministic => false,
                ReflectancePolicy::Schlick => Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng),
            };

        let direction = if reflects {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterResult::new(Color::ONE, Ray::new(rec.p, direction)))
    }
}

/// Light emitter. Ends the path with `albedo * intensity`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffuseLight {
    albedo: Color,
    intensity: f32,
}

impl DiffuseLight {
    /// Create a new light with the given color and intensity.
    pub fn new(albedo: Color, intensity: f32) -> Self {
        Self { albedo, intensity }
    }

    /// Emitted radiance.
    pub fn emit(&self) -> Color {
        self.albedo * self.intensity
    }
}

impl Scatter for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // The outgoing ray is never traced
        Some(ScatterResult::new(self.emit(), Ray::new(rec.p, rec.normal)))
    }

    fn is_light(&self) -> bool {
        true
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
