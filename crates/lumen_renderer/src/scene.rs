//! Scene descriptions: built-in scenes and JSON scene files.
//!
//! A JSON scene names each material once and lets spheres refer to it,
//! so one material record is shared by every sphere that uses it:
//!
//! ```json
//! {
//!   "camera": { "look_from": [13, 2, 3], "vfov": 20 },
//!   "materials": {
//!     "ground": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] },
//!     "glass": { "type": "dielectric", "ior": 1.5 }
//!   },
//!   "spheres": [
//!     { "center": [0, -1000, 0], "radius": 1000, "material": "ground" },
//!     { "center": [0, 1, 0], "radius": 1, "material": "glass" }
//!   ]
//! }
//! ```

use crate::random::{gen_f32, gen_range_f32, random_color, random_color_range};
use crate::{
    CameraSettings, Color, Dielectric, DiffuseLight, HittableList, Lambertian, Material, Metal,
    ReflectancePolicy, Sphere,
};
use lumen_math::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown built-in scene '{0}' (expected small, random or single)")]
    UnknownScene(String),

    #[error("Sphere {index} refers to unknown material '{name}'")]
    UnknownMaterial { index: usize, name: String },

    #[error("Sphere {index} has invalid radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Geometry plus the camera that frames it.
#[derive(Debug, Clone)]
pub struct Scene {
    pub world: HittableList,
    pub camera: CameraSettings,
}

/// Scenes that ship with the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScene {
    /// Ground plus three large spheres
    Small,
    /// Ground, a grid of small random spheres and three large spheres
    Random,
    /// A single diffuse ground sphere
    Single,
}

impl FromStr for BuiltinScene {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(BuiltinScene::Small),
            "random" => Ok(BuiltinScene::Random),
            "single" => Ok(BuiltinScene::Single),
            _ => Err(SceneError::UnknownScene(s.to_string())),
        }
    }
}

impl BuiltinScene {
    /// Build the scene. `policy` applies to every dielectric in it.
    pub fn build(self, policy: ReflectancePolicy, rng: &mut dyn RngCore) -> Scene {
        match self {
            BuiltinScene::Small => small_scene(policy),
            BuiltinScene::Random => random_scene(policy, rng),
            BuiltinScene::Single => single_sphere_scene(),
        }
    }
}

fn shared(material: impl Into<Material>) -> Arc<Material> {
    Arc::new(material.into())
}

fn ground() -> Sphere {
    Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        shared(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    )
}

/// Ground plus a glass, a diffuse and a mirror sphere.
pub fn small_scene(policy: ReflectancePolicy) -> Scene {
    let mut world = HittableList::new();
    world.add(ground());
    world.add(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        shared(Dielectric::with_policy(1.5, policy)),
    ));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 1.0),
        1.0,
        shared(Lambertian::new(Color::new(0.05, 0.05, 0.35))),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        shared(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    Scene {
        world,
        camera: CameraSettings::default(),
    }
}

/// The classic cover scene: a 22x22 grid of small random spheres.
pub fn random_scene(policy: ReflectancePolicy, rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();
    world.add(ground());

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            // Keep clear of the large metal sphere
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material = if choose_mat < 0.8 {
                let albedo = random_color(rng) * random_color(rng);
                shared(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                let albedo = random_color_range(rng, 0.5, 1.0);
                let fuzz = gen_range_f32(rng, 0.0, 0.5);
                shared(Metal::new(albedo, fuzz))
            } else {
                shared(Dielectric::with_policy(1.5, policy))
            };
            world.add(Sphere::new(center, 0.2, material));
        }
    }

    world.add(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        shared(Dielectric::with_policy(1.5, policy)),
    ));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        shared(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        shared(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    Scene {
        world,
        camera: CameraSettings::default(),
    }
}

/// One diffuse sphere of radius 1000 under the origin, seen from (0, 0, 5).
pub fn single_sphere_scene() -> Scene {
    let mut world = HittableList::new();
    world.add(ground());

    Scene {
        world,
        camera: CameraSettings::default()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_lens(90.0, 0.0, 5.0),
    }
}

/// A material entry in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    Lambertian {
        albedo: Vec3,
    },
    Metal {
        albedo: Vec3,
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        ior: f32,
        #[serde(default)]
        reflectance: ReflectancePolicy,
    },
    Light {
        albedo: Vec3,
        #[serde(default = "default_intensity")]
        intensity: f32,
    },
}

fn default_intensity() -> f32 {
    1.0
}

impl MaterialDescription {
    fn build(&self, policy_override: Option<ReflectancePolicy>) -> Material {
        match *self {
            MaterialDescription::Lambertian { albedo } => Lambertian::new(albedo).into(),
            MaterialDescription::Metal { albedo, fuzz } => Metal::new(albedo, fuzz).into(),
            MaterialDescription::Dielectric { ior, reflectance } => {
                Dielectric::with_policy(ior, policy_override.unwrap_or(reflectance)).into()
            }
            MaterialDescription::Light { albedo, intensity } => DiffuseLight::new(albedo, intensity).into(),
        }
    }
}

/// A sphere entry in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    pub material: String,
}

/// Serializable scene file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDescription>,
    #[serde(default)]
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    /// Parse a scene from a JSON string.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Build the scene. Each named material is created once and shared.
    pub fn build(&self, policy_override: Option<ReflectancePolicy>) -> SceneResult<Scene> {
        let materials: BTreeMap<&str, Arc<Material>> = self
            .materials
            .iter()
            .map(|(name, desc)| (name.as_str(), Arc::new(desc.build(policy_override))))
            .collect();

        let mut world = HittableList::new();
        for (index, sphere) in self.spheres.iter().enumerate() {
            if !(sphere.radius >= 0.0) {
                return Err(SceneError::InvalidRadius {
                    index,
                    radius: sphere.radius,
                });
            }
            let material = materials
                .get(sphere.material.as_str())
                .ok_or_else(|| SceneError::UnknownMaterial {
                    index,
                    name: sphere.material.clone(),
                })?;
            world.add(Sphere::new(sphere.center, sphere.radius, Arc::clone(material)));
        }

        Ok(Scene {
            world,
            camera: self.camera.clone(),
        })
    }
}

/// Load a built-in scene by name, or a JSON scene file by path.
///
/// `policy_override` replaces the reflectance policy of every dielectric
/// when set.
pub fn load_scene(
    name_or_path: &str,
    policy_override: Option<ReflectancePolicy>,
    rng: &mut dyn RngCore,
) -> SceneResult<Scene> {
    match name_or_path.parse::<BuiltinScene>() {
        Ok(builtin) => {
            let scene = builtin.build(policy_override.unwrap_or_default(), rng);
            log::info!("Built scene '{}' with {} objects", name_or_path, scene.world.len());
            Ok(scene)
        }
        Err(err) if !Path::new(name_or_path).exists() => Err(err),
        Err(_) => {
            let scene = SceneDescription::load(name_or_path)?.build(policy_override)?;
            log::info!("Loaded {} objects from {}", scene.world.len(), name_or_path);
            Ok(scene)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Scatter;
    use crate::{Hittable, Primitive};
    use lumen_math::{Interval, Ray};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SCENE_JSON: &str = r#"{
        "camera": { "look_from": [0, 0, 5], "look_at": [0, 0, 0], "vfov": 60, "aperture": 0 },
        "materials": {
            "chrome": { "type": "metal", "albedo": [0.8, 0.8, 0.8], "fuzz": 0.1 },
            "lamp": { "type": "light", "albedo": [1, 1, 1], "intensity": 4 },
            "glass": { "type": "dielectric", "ior": 1.5 }
        },
        "spheres": [
            { "center": [-1, 0, 0], "radius": 0.5, "material": "chrome" },
            { "center": [1, 0, 0], "radius": 0.5, "material": "chrome" },
            { "center": [0, 3, 0], "radius": 1, "material": "lamp" },
            { "center": [0, 0, -2], "radius": 1, "material": "glass" }
        ]
    }"#;

    fn spheres(world: &HittableList) -> Vec<&Sphere> {
        world
            .iter()
            .map(|p| match p {
                Primitive::Sphere(s) => s,
            })
            .collect()
    }

    #[test]
    fn test_small_scene_layout() {
        let scene = small_scene(ReflectancePolicy::Deterministic);
        assert_eq!(scene.world.len(), 4);

        let ground = spheres(&scene.world)[0];
        assert_eq!(ground.center(), Vec3::new(0.0, -1000.0, 0.0));
        assert_eq!(ground.radius(), 1000.0);
    }

    #[test]
    fn test_random_scene_has_grid_and_feature_spheres() {
        let mut rng = StdRng::seed_from_u64(42);
        let scene = random_scene(ReflectancePolicy::Schlick, &mut rng);

        // Ground + at most 22x22 small spheres + 3 feature spheres
        assert!(scene.world.len() > 400 && scene.world.len() <= 1 + 484 + 3);

        let all = spheres(&scene.world);
        let small: Vec<_> = all.iter().filter(|s| s.radius() == 0.2).collect();
        assert!(small
            .iter()
            .all(|s| (s.center() - Vec3::new(4.0, 0.2, 0.0)).length() > 0.9));

        for sphere in &all {
            if let Material::Dielectric(d) = sphere.material().as_ref() {
                assert_eq!(d.policy(), ReflectancePolicy::Schlick);
            }
        }
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!("small".parse::<BuiltinScene>().unwrap(), BuiltinScene::Small);
        assert_eq!("RANDOM".parse::<BuiltinScene>().unwrap(), BuiltinScene::Random);
        assert_eq!("single".parse::<BuiltinScene>().unwrap(), BuiltinScene::Single);
        assert!(matches!(
            "cornell".parse::<BuiltinScene>(),
            Err(SceneError::UnknownScene(_))
        ));
    }

    #[test]
    fn test_json_scene_shares_materials() {
        let scene = SceneDescription::from_json_str(SCENE_JSON)
            .unwrap()
            .build(None)
            .unwrap();
        assert_eq!(scene.world.len(), 4);
        assert_eq!(scene.camera.vfov, 60.0);
        assert_eq!(scene.camera.aperture, 0.0);

        let all = spheres(&scene.world);
        assert!(Arc::ptr_eq(all[0].material(), all[1].material()));
        assert!(!Arc::ptr_eq(all[0].material(), all[2].material()));
        assert!(all[2].material().is_light());
    }

    #[test]
    fn test_json_policy_override() {
        let desc = SceneDescription::from_json_str(SCENE_JSON).unwrap();

        let scene = desc.build(Some(ReflectancePolicy::Schlick)).unwrap();
        let glass = spheres(&scene.world)[3];
        assert_eq!(
            glass.material().as_ref(),
            &Material::from(Dielectric::with_policy(1.5, ReflectancePolicy::Schlick))
        );

        let scene = desc.build(None).unwrap();
        let glass = spheres(&scene.world)[3];
        assert_eq!(glass.material().as_ref(), &Material::from(Dielectric::new(1.5)));
    }

    #[test]
    fn test_json_scene_is_hittable() {
        let scene = SceneDescription::from_json_str(SCENE_JSON)
            .unwrap()
            .build(None)
            .unwrap();
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), -Vec3::Z);
        let rec = scene.world.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_json_unknown_material() {
        let json = r#"{ "spheres": [ { "center": [0, 0, 0], "radius": 1, "material": "nope" } ] }"#;
        let err = SceneDescription::from_json_str(json).unwrap().build(None).unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial { index: 0, ref name } if name == "nope"));
    }

    #[test]
    fn test_json_negative_radius() {
        let json = r#"{
            "materials": { "m": { "type": "lambertian", "albedo": [1, 1, 1] } },
            "spheres": [ { "center": [0, 0, 0], "radius": -1, "material": "m" } ]
        }"#;
        let err = SceneDescription::from_json_str(json).unwrap().build(None).unwrap_err();
        assert!(matches!(err, SceneError::InvalidRadius { index: 0, .. }));
    }

    #[test]
    fn test_json_malformed() {
        let err = SceneDescription::from_json_str("{ \"spheres\": 3 }").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn test_load_scene_unknown_name() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = load_scene("definitely-not-a-scene", None, &mut rng).unwrap_err();
        assert!(matches!(err, SceneError::UnknownScene(_)));
    }

    #[test]
    fn test_load_scene_from_file() {
        let path = std::env::temp_dir().join(format!("lumen-scene-{}.json", std::process::id()));
        std::fs::write(&path, SCENE_JSON).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let scene = load_scene(path.to_str().unwrap(), None, &mut rng).unwrap();
        assert_eq!(scene.world.len(), 4);

        std::fs::remove_file(&path).unwrap();
    }
}
