//! Edge-density checks: overlay/watermark detection and text-structure floor.
//!
//! A genuine receipt body is photographed text at roughly uniform density. A
//! pasted watermark, sticker, or redaction box introduces a sharp-edged
//! rectangle that spikes local edge density; a blank or cropped-out body drops
//! it to nearly zero. Both checks share one Canny pass configuration.

use crate::config::{OverlayPolicy, TextStructurePolicy};
use crate::region::crop;
use crate::validation_types::ReasonCode;
use anyhow::Result;
use image::GrayImage;
use imageproc::edges::canny;
use log::debug;

/// Mean intensity of the Canny edge map (edge pixels are 255), over the whole
/// given buffer.
pub fn edge_density(image: &GrayImage, low: f32, high: f32) -> f64 {
    let edges = canny(image, low, high);
    let samples = edges.as_raw();
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&v| f64::from(v)).sum::<f64>() / samples.len() as f64
}

/// Overlay gate: edge density inside the watermark zone of the aligned,
/// un-blurred candidate. Runs before the diff and structural checks so that an
/// overlay artifact is not absorbed into an otherwise-acceptable similarity
/// score.
pub fn check_overlay(
    candidate: &GrayImage,
    policy: &OverlayPolicy,
    low: f32,
    high: f32,
) -> Result<Option<ReasonCode>> {
    let rect = policy.region.resolve(candidate.width(), candidate.height())?;
    let zone = crop(candidate, &rect);
    let density = edge_density(&zone, low, high);
    debug!(
        "overlay gate: edge density {density:.2}, limit {:.2}",
        policy.edge_limit
    );
    if density > policy.edge_limit {
        return Ok(Some(ReasonCode::OverlayDetected));
    }
    Ok(None)
}

/// Text-structure gate: the content region must carry at least a minimum edge
/// density to plausibly contain receipt text.
pub fn check_text_structure(
    candidate: &GrayImage,
    policy: &TextStructurePolicy,
    low: f32,
    high: f32,
) -> Result<Option<ReasonCode>> {
    let rect = policy.region.resolve(candidate.width(), candidate.height())?;
    let zone = crop(candidate, &rect);
    let density = edge_density(&zone, low, high);
    debug!(
        "text-structure gate: edge density {density:.2}, minimum {:.2}",
        policy.min_edge_density
    );
    if density < policy.min_edge_density {
        return Ok(Some(ReasonCode::NoTextStructure));
    }
    Ok(None)
}
