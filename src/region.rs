//! Template-relative region extraction.
//!
//! Regions are stored as fractional coordinates so one configuration works for
//! any concrete image size; they are resolved against a width/height only at
//! evaluation time, after the candidate has been aligned to the template.

use anyhow::{ensure, Result};
use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use serde::Serialize;

/// Rectangle as fractions of image dimensions, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Region resolved to integer pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Region {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Resolve fractional bounds against concrete dimensions via
    /// `floor(fraction * dimension)`, clamped into `[0, dimension]`.
    ///
    /// A zero-area result can only arise from misconfigured fractions, never
    /// from runtime input, so it fails loudly instead of producing an empty
    /// crop downstream.
    pub fn resolve(&self, width: u32, height: u32) -> Result<PixelRect> {
        let x1 = ((self.left * f64::from(width)).floor() as i64).clamp(0, i64::from(width)) as u32;
        let x2 = ((self.right * f64::from(width)).floor() as i64).clamp(0, i64::from(width)) as u32;
        let y1 = ((self.top * f64::from(height)).floor() as i64).clamp(0, i64::from(height)) as u32;
        let y2 =
            ((self.bottom * f64::from(height)).floor() as i64).clamp(0, i64::from(height)) as u32;

        debug_assert!(x2 > x1 && y2 > y1, "misconfigured region fractions: {self:?}");
        ensure!(
            x2 > x1 && y2 > y1,
            "region {self:?} resolves to zero area at {width}x{height}"
        );

        Ok(PixelRect {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }
}

/// Extract the sub-image covered by `rect` as a new buffer.
pub fn crop(image: &GrayImage, rect: &PixelRect) -> GrayImage {
    image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// Gaussian pre-blur applied to both crops before difference/edge computation
/// to suppress compression-noise false positives.
pub fn pre_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(image, sigma)
}
