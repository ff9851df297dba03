//! Image output: tone mapping and file writing.

use crate::buffer::ImageBuffer;
use crate::Color;
use image::RgbImage;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Sample count must be positive")]
    ZeroSamples,
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a summed color to 8-bit RGB, averaging over `samples_per_pixel`.
pub fn color_to_rgb8(sum: Color, samples_per_pixel: u32) -> [u8; 3] {
    quantize(sum / samples_per_pixel as f32)
}

fn quantize(color: Color) -> [u8; 3] {
    // NaN from a degenerate sample maps to black
    let channel = |c: f32| (255.0 * clamp_01(linear_to_gamma(c))) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Tone map a raw render into an 8-bit image.
pub fn to_rgb_image(image: &ImageBuffer) -> Result<RgbImage, OutputError> {
    let expected = image.width as usize * image.height as usize;
    if image.pixels.len() != expected {
        return Err(OutputError::SizeMismatch {
            expected,
            actual: image.pixels.len(),
        });
    }
    if image.samples_per_pixel == 0 {
        return Err(OutputError::ZeroSamples);
    }

    Ok(RgbImage::from_fn(image.width, image.height, |x, y| {
        image::Rgb(quantize(image.mean(x, y)))
    }))
}

/// Write a raw render to disk. The format follows the file extension.
pub fn write_image<P: AsRef<Path>>(image: &ImageBuffer, path: P) -> Result<(), OutputError> {
    let path = path.as_ref();
    to_rgb_image(image)?.save(path)?;
    log::info!("Saved {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}
