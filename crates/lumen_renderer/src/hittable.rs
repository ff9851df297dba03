//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Sphere};
use lumen_math::{Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// Only lives for a single shading step; it borrows the material from
/// the object that was hit.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting `outward_normal` against the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a Material) -> Self {
        let (front_face, normal) = face_normal(ray, outward_normal);
        Self {
            p: ray.at(t),
            normal,
            t,
            front_face,
            material,
        }
    }
}

/// Orient a normal so it always opposes the incoming ray.
///
/// Returns `(front_face, normal)`; `front_face` is false when the ray
/// travels with the outward normal, i.e. it is leaving the object.
#[inline]
pub fn face_normal(ray: &Ray, outward_normal: Vec3) -> (bool, Vec3) {
    let front_face = ray.direction().dot(outward_normal) < 0.0;
    let normal = if front_face {
        outward_normal
    } else {
        -outward_normal
    };
    (front_face, normal)
}

/// Trait for objects that can be hit by rays.
///
/// Implementors are immutable during rendering and shared by every
/// worker thread.
pub trait Hittable: Send + Sync {
    /// Closest intersection of `ray` with this object inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

/// The closed set of geometry the renderer knows about.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
}

impl Hittable for Primitive {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Primitive::Sphere(sphere) => sphere.hit(ray, ray_t),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

/// A list of hittable objects, intersected by linear scan.
#[derive(Debug, Clone, Default)]
pub struct HittableList {
    objects: Vec<Primitive>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Primitive>) {
        self.objects.push(object.into());
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.objects.iter()
    }
}

impl FromIterator<Primitive> for HittableList {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            // Shrink the search interval to the best hit found so far
            let interval = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
            if let Some(rec) = object.hit(ray, interval) {
                closest = Some(rec);
            }
        }

        closest
    }
}
