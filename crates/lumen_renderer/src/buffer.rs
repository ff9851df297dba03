//! Per-pixel accumulation storage.
//!
//! The image is split into scanlines; each scanline slot can be filled
//! exactly once. Jobs own disjoint rows, so writers never contend and a
//! second write to the same row is reported instead of silently
//! accumulating.

use crate::Color;
use std::sync::OnceLock;
use thiserror::Error;

/// Violations of the one-write-per-scanline rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("scanline {row} is outside an image of height {height}")]
    RowOutOfRange { row: u32, height: u32 },

    #[error("scanline {row} has {actual} pixels, expected {expected}")]
    RowLength { row: u32, expected: usize, actual: usize },

    #[error("scanline {0} was written more than once")]
    DuplicateRow(u32),

    #[error("{} scanline(s) were never written", .0.len())]
    MissingRows(Vec<u32>),
}

/// Shared accumulator written concurrently by scanline jobs.
///
/// Row 0 is the top of the image. Pixel `(x, y)` lives at flat index
/// `y * width + x` once the buffer is collected.
#[derive(Debug)]
pub struct AccumulationBuffer {
    width: u32,
    height: u32,
    rows: Box<[OnceLock<Box<[Color]>>]>,
}

impl AccumulationBuffer {
    /// Create a buffer with every scanline unwritten.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rows: (0..height).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Store the summed colors of one scanline.
    pub fn write_row(&self, row: u32, pixels: Vec<Color>) -> Result<(), BufferError> {
        let slot = self.rows.get(row as usize).ok_or(BufferError::RowOutOfRange {
            row,
            height: self.height,
        })?;

        if pixels.len() != self.width as usize {
            return Err(BufferError::RowLength {
                row,
                expected: self.width as usize,
                actual: pixels.len(),
            });
        }

        slot.set(pixels.into_boxed_slice())
            .map_err(|_| BufferError::DuplicateRow(row))
    }

    /// Rows that have not been written yet, in order.
    pub fn missing_rows(&self) -> Vec<u32> {
        (0..self.height)
            .filter(|&row| self.rows[row as usize].get().is_none())
            .collect()
    }

    /// Flatten into a row-major pixel vector. Fails if any row is missing.
    pub fn collect_pixels(&self) -> Result<Vec<Color>, BufferError> {
        let missing = self.missing_rows();
        if !missing.is_empty() {
            return Err(BufferError::MissingRows(missing));
        }

        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in self.rows.iter().filter_map(OnceLock::get) {
            pixels.extend_from_slice(row);
        }
        Ok(pixels)
    }
}

/// Finished render: raw per-pixel sums in linear space, not yet divided
/// by the sample count or gamma corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Take the pixels out of a completely written accumulation buffer.
    pub fn from_accumulation(buffer: &AccumulationBuffer, samples_per_pixel: u32) -> Result<Self, BufferError> {
        Ok(Self {
            width: buffer.width(),
            height: buffer.height(),
            samples_per_pixel,
            pixels: buffer.collect_pixels()?,
        })
    }

    /// Get the summed color at (x, y), y = 0 being the top row.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Average color at (x, y).
    pub fn mean(&self, x: u32, y: u32) -> Color {
        self.get(x, y) / self.samples_per_pixel.max(1) as f32
    }
}
