//! Render and camera configuration.

use crate::thread_pool::hardware_concurrency;
use lumen_math::{NearZero, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("samples per pixel must be positive")]
    ZeroSamples,

    #[error("worker thread count must be positive")]
    ZeroThreads,

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),

    #[error("focus distance must be positive, got {0}")]
    FocusDistance(f32),

    #[error("aperture must be non-negative, got {0}")]
    Aperture(f32),

    #[error("aspect ratio must be positive, got {0}")]
    AspectRatio(f32),

    #[error("camera view is degenerate: look_from == look_at or up is parallel to the view direction")]
    DegenerateView,
}

/// Image and sampling settings for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel; noise falls and render time grows linearly
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Requested worker threads (clamped to hardware concurrency by the pool)
    pub num_threads: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            num_threads: hardware_concurrency(),
        }
    }
}

impl RenderSettings {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set the requested number of worker threads.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.num_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

/// Camera placement and lens parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f32,
    /// Overrides the image aspect ratio when set
    pub aspect_ratio: Option<f32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            aperture: 0.1,
            focus_dist: 10.0,
            aspect_ratio: None,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Force an aspect ratio instead of deriving it from the image.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::FieldOfView(self.vfov));
        }
        if !(self.focus_dist > 0.0) {
            return Err(ConfigError::FocusDistance(self.focus_dist));
        }
        if !(self.aperture >= 0.0) {
            return Err(ConfigError::Aperture(self.aperture));
        }
        if let Some(aspect) = self.aspect_ratio {
            if !(aspect > 0.0) {
                return Err(ConfigError::AspectRatio(aspect));
            }
        }
        let view = self.look_from - self.look_at;
        if view.near_zero() || self.vup.cross(view).near_zero() {
            return Err(ConfigError::DegenerateView);
        }
        Ok(())
    }
}
