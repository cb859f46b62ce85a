//! Photometric quality gate: resolution, brightness, and blur checks.
//!
//! These run before any comparison is attempted so that obviously unusable
//! captures are rejected without touching the template. Checks run in a fixed
//! order (resolution, brightness, blur) and short-circuit on first failure.

use crate::config::QualityPolicy;
use crate::validation_types::ReasonCode;
use anyhow::Result;
use image::GrayImage;
use imageproc::filter::filter3x3;
use log::debug;

const K_LAPLACIAN: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

type GrayF32 = image::ImageBuffer<image::Luma<f32>, Vec<f32>>;

/// Mean intensity over the whole buffer.
pub fn mean_intensity(image: &GrayImage) -> f64 {
    let samples = image.as_raw();
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&v| f64::from(v)).sum::<f64>() / samples.len() as f64
}

/// Laplacian-variance sharpness metric: the variance of the 3x3 Laplacian
/// response over the whole image. Flat or defocused captures score near zero.
pub fn laplacian_variance(image: &GrayImage) -> f64 {
    let gray: GrayF32 = GrayF32::from_raw(
        image.width(),
        image.height(),
        image.as_raw().iter().map(|&v| f32::from(v)).collect(),
    )
    .unwrap_or_else(|| GrayF32::new(0, 0));

    let response = filter3x3(&gray, &K_LAPLACIAN);
    let response: Vec<f32> = response.into_raw();
    if response.is_empty() {
        return 0.0;
    }

    let n = response.len() as f64;
    let mean = response.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    response
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

/// Run the enabled quality checks in order; the first failing check determines
/// the rejection reason. `None` means the candidate passed.
pub fn check_quality(image: &GrayImage, policy: &QualityPolicy) -> Result<Option<ReasonCode>> {
    let (width, height) = image.dimensions();

    if let Some(min_width) = policy.min_width {
        if width < min_width {
            debug!("resolution gate: width {width} < {min_width}");
            return Ok(Some(ReasonCode::LowResolution));
        }
    }
    if let Some(min_height) = policy.min_height {
        if height < min_height {
            debug!("resolution gate: height {height} < {min_height}");
            return Ok(Some(ReasonCode::LowResolution));
        }
    }

    if let Some(bounds) = &policy.brightness {
        let mean = match &bounds.region {
            Some(region) => {
                let rect = region.resolve(width, height)?;
                mean_intensity(&crate::region::crop(image, &rect))
            }
            None => mean_intensity(image),
        };
        debug!(
            "brightness gate: mean {mean:.1}, bounds [{:.1}, {:.1}]",
            bounds.min, bounds.max
        );
        if mean < bounds.min {
            return Ok(Some(ReasonCode::ImageTooDark));
        }
        if mean > bounds.max {
            return Ok(Some(ReasonCode::ImageTooBright));
        }
    }

    if let Some(min_variance) = policy.min_blur_variance {
        let variance = laplacian_variance(image);
        debug!("blur gate: laplacian variance {variance:.1}, minimum {min_variance:.1}");
        if variance < min_variance {
            return Ok(Some(ReasonCode::ImageTooBlurry));
        }
    }

    Ok(None)
}
