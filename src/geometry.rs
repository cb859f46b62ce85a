//! Aspect-ratio gate.
//!
//! Runs before alignment: resizing to template dimensions would silently erase
//! a genuine aspect mismatch, so the ratio is checked on the raw decoded
//! dimensions.

use crate::config::GeometryPolicy;
use crate::validation_types::ReasonCode;
use anyhow::{ensure, Result};
use log::debug;

/// Check the candidate's width/height ratio against the profile policy.
/// `reference_ratio` is required for template-relative policies.
pub fn check_aspect(
    width: u32,
    height: u32,
    policy: &GeometryPolicy,
    reference_ratio: Option<f64>,
) -> Result<Option<ReasonCode>> {
    ensure!(
        width > 0 && height > 0,
        "degenerate candidate dimensions {width}x{height}"
    );
    let ratio = f64::from(width) / f64::from(height);

    match policy {
        GeometryPolicy::TemplateRelative { tolerance } => {
            let reference = reference_ratio
                .ok_or_else(|| anyhow::anyhow!("template-relative geometry check without a reference ratio"))?;
            let deviation = (reference - ratio).abs();
            debug!(
                "geometry gate: ratio {ratio:.3} vs reference {reference:.3}, deviation {deviation:.3}, tolerance {tolerance:.3}"
            );
            if deviation > *tolerance {
                return Ok(Some(ReasonCode::AspectRatioMismatch));
            }
        }
        GeometryPolicy::AbsoluteBand { min, max } => {
            debug!("geometry gate: ratio {ratio:.3}, band [{min:.3}, {max:.3}]");
            if ratio < *min || ratio > *max {
                return Ok(Some(ReasonCode::InvalidScreenshotRatio));
            }
        }
    }

    Ok(None)
}
