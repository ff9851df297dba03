//! Sphere primitive for ray tracing.

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use lumen_math::{Interval, Ray, Vec3};
use std::sync::Arc;

/// A sphere primitive.
///
/// The material is shared: many spheres may point at the same record.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (h + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, &self.material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian};

    fn unit_sphere_at(center: Vec3) -> Sphere {
        Sphere::new(center, 1.0, Arc::new(Lambertian::new(Color::splat(0.5)).into()))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::splat(0.5)).into()),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere
            .hit(&ray, Interval::from_min(0.001))
            .expect("ray should hit");

        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!((rec.p - Vec3::new(0.0, 0.0, -0.5)).length() < 0.001);
        assert!((rec.normal - Vec3::Z).length() < 0.001);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -3.0));

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, Interval::from_min(0.001)).is_none());

        // Ray passing just beside it
        let ray = Ray::new(Vec3::new(1.01, 0.0, 0.0), -Vec3::Z);
        assert!(sphere.hit(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_flips_normal() {
        let sphere = unit_sphere_at(Vec3::ZERO);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let rec = sphere
            .hit(&ray, Interval::from_min(0.001))
            .expect("ray from the center must hit the shell");

        // Smaller root is behind the origin, so the far root is used
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_both_roots_outside_interval() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(sphere.hit(&ray, Interval::new(0.001, 3.9)).is_none());
    }

    #[test]
    fn test_normal_always_opposes_ray() {
        let sphere = unit_sphere_at(Vec3::ZERO);
        let origins = [
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(0.3, 0.2, 0.1),
            Vec3::new(-3.0, 0.5, 0.0),
            Vec3::new(0.0, -0.9, 0.0),
        ];

        for origin in origins {
            for direction in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, -Vec3::Z, Vec3::new(1.0, 1.0, -1.0)] {
                let ray = Ray::new(origin, direction);
                if let Some(rec) = sphere.hit(&ray, Interval::from_min(0.001)) {
                    assert!(
                        rec.normal.dot(ray.direction()) <= 0.0,
                        "normal {:?} faces along ray {:?}",
                        rec.normal,
                        direction
                    );
                }
            }
        }
    }

    #[test]
    fn test_negative_radius_clamped() {
        let sphere = Sphere::new(Vec3::ZERO, -2.0, Arc::new(Lambertian::new(Color::ONE).into()));
        assert_eq!(sphere.radius(), 0.0);
    }
}
