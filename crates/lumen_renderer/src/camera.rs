//! Camera for ray generation.

use crate::random::random_in_unit_disk;
use crate::settings::{CameraSettings, ConfigError};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Thin-lens camera.
///
/// All fields are derived once from [`CameraSettings`]; the camera is
/// read-only afterwards and shared by every worker.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Build a camera. `image_aspect` is used unless the settings carry
    /// their own aspect ratio.
    pub fn new(settings: &CameraSettings, image_aspect: f32) -> Result<Self, ConfigError> {
        settings.validate()?;
        let aspect_ratio = settings.aspect_ratio.unwrap_or(image_aspect);
        if !(aspect_ratio > 0.0) {
            return Err(ConfigError::AspectRatio(aspect_ratio));
        }

        // Calculate viewport dimensions
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = settings.look_from;
        let horizontal = settings.focus_dist * viewport_width * u;
        let vertical = settings.focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - settings.focus_dist * w;

        Ok(Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: settings.aperture / 2.0,
        })
    }

    /// Generate a ray through normalized viewport coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner and `(1, 1)` the upper-right.
    /// The origin is jittered across the lens for depth of field.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole() -> Camera {
        let settings = CameraSettings::default()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        Camera::new(&settings, 2.0).unwrap()
    }

    #[test]
    fn test_camera_basis() {
        let camera = pinhole();
        assert!((camera.u - Vec3::X).length() < 1e-5);
        assert!((camera.v - Vec3::Y).length() < 1e-5);
        assert!((camera.w - Vec3::Z).length() < 1e-5);
        assert_eq!(camera.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_camera_center_and_corner_rays() {
        let camera = pinhole();
        let mut rng = StdRng::seed_from_u64(42);

        // Center ray points straight down -Z
        let center = camera.get_ray(0.5, 0.5, &mut rng);
        assert!((center.direction().normalize() + Vec3::Z).length() < 1e-5);

        // vfov 90 at focus 1 gives a 2x4 viewport for aspect 2
        let corner = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((corner.direction() - Vec3::new(-2.0, -1.0, -1.0)).length() < 1e-5);

        let top_right = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((top_right.direction() - Vec3::new(2.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_pinhole_rays_share_origin() {
        let camera = pinhole();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(camera.get_ray(0.3, 0.7, &mut rng).origin(), Vec3::ZERO);
        }
    }

    #[test]
    fn test_lens_rays_converge_on_focus_plane() {
        let settings = CameraSettings::default()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(40.0, 2.0, 5.0);
        let camera = Camera::new(&settings, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let mut saw_offset = false;
        let mut focus_point: Option<Vec3> = None;
        for _ in 0..50 {
            let ray = camera.get_ray(0.25, 0.6, &mut rng);
            let offset = ray.origin() - camera.origin();
            assert!(offset.length() <= camera.lens_radius() + 1e-5);
            saw_offset |= offset.length() > 1e-3;

            // Every ray reaches the same point on the focus plane at t = 1
            let target = *focus_point.get_or_insert(ray.at(1.0));
            assert!((ray.at(1.0) - target).length() < 1e-4);
        }
        assert!(saw_offset);
    }

    #[test]
    fn test_explicit_aspect_overrides_image() {
        let settings = CameraSettings::default()
            .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .with_aspect_ratio(1.0);
        let camera = Camera::new(&settings, 3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let corner = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((corner.direction() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = CameraSettings::default().with_lens(0.0, 0.0, 1.0);
        assert!(matches!(Camera::new(&settings, 1.0), Err(ConfigError::FieldOfView(_))));
        assert!(matches!(
            Camera::new(&CameraSettings::default(), 0.0),
            Err(ConfigError::AspectRatio(_))
        ));
    }
}
