// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
pub use interval::Interval;
pub use ray::Ray;

/// Threshold below which a vector component counts as zero.
pub const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// Degeneracy test for vectors produced by random sampling.
pub trait NearZero {
    /// True if every component is within [`NEAR_ZERO_EPSILON`] of zero.
    fn near_zero(&self) -> bool;
}

impl NearZero for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        self.abs().cmplt(Vec3::splat(NEAR_ZERO_EPSILON)).all()
    }
}
