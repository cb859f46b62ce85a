//! Coarse mean-difference scorer.
//!
//! A fast reject for gross mismatches (wrong screen, wrong app, solid-color
//! failures) before the costlier structural comparison runs.

use anyhow::{ensure, Result};
use image::GrayImage;

/// Mean absolute pixel-intensity difference between two equally-sized buffers.
pub fn mean_abs_diff(reference: &GrayImage, candidate: &GrayImage) -> Result<f64> {
    ensure!(
        reference.dimensions() == candidate.dimensions(),
        "dimension mismatch in difference scorer: {:?} vs {:?}",
        reference.dimensions(),
        candidate.dimensions()
    );

    let a = reference.as_raw();
    let b = candidate.as_raw();
    ensure!(!a.is_empty(), "empty buffers in difference scorer");

    let total: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    Ok(total as f64 / a.len() as f64)
}
