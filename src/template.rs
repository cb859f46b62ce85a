//! The process-wide reference template.
//!
//! Loaded once at startup and held read-only for the process lifetime; every
//! template-relative validation call borrows it. Failing to load is fatal to
//! the service, since no validation decision is meaningful without it.

use crate::decode::decode_gray;
use anyhow::{ensure, Context, Result};
use image::GrayImage;
use log::info;
use std::path::Path;

/// Canonical reference image representing the expected, unmodified layout.
#[derive(Debug, Clone)]
pub struct ReferenceTemplate {
    image: GrayImage,
    aspect_ratio: f64,
}

impl ReferenceTemplate {
    /// Load and decode the template file. Called once at process start;
    /// any failure here must prevent the service from starting.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read template file: {}", path.display()))?;
        let image = decode_gray(&bytes)
            .with_context(|| format!("failed to decode template image: {}", path.display()))?;
        let template = Self::from_image(image)?;
        info!(
            "loaded reference template {} ({}x{})",
            path.display(),
            template.width(),
            template.height()
        );
        Ok(template)
    }

    pub fn from_image(image: GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        ensure!(
            width > 0 && height > 0,
            "reference template has degenerate dimensions {width}x{height}"
        );
        Ok(ReferenceTemplate {
            aspect_ratio: f64::from(width) / f64::from(height),
            image,
        })
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_from_image_derives_aspect_ratio() {
        let img = GrayImage::from_pixel(400, 600, Luma([255u8]));
        let template = ReferenceTemplate::from_image(img).unwrap();
        assert_eq!(template.width(), 400);
        assert_eq!(template.height(), 600);
        assert!((template.aspect_ratio() - 400.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = ReferenceTemplate::load(Path::new("/nonexistent/template.jpg"));
        assert!(result.is_err());
    }
}
