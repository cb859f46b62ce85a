//! Edge-domain structural similarity scorer.
//!
//! Both content crops are reduced to Canny edge maps, then compared with a
//! windowed structural similarity index (Wang et al., 2004): local mean,
//! variance, and covariance over a sliding uniform window, averaged to one
//! scalar in [-1, 1]. Scoring edge maps rather than raw intensity keeps the
//! score robust to brightness and contrast drift between capture devices while
//! still penalizing layout deviation.

use anyhow::{ensure, Result};
use image::GrayImage;
use imageproc::edges::canny;

/// Sliding window side length.
pub const SSIM_WINDOW: u32 = 7;

// Standard constants for 8-bit dynamic range: C1 = (K1*L)^2, C2 = (K2*L)^2.
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Windowed mean structural similarity between two equally-sized buffers.
pub fn windowed_ssim(reference: &GrayImage, candidate: &GrayImage) -> Result<f64> {
    ensure!(
        reference.dimensions() == candidate.dimensions(),
        "dimension mismatch in structural scorer: {:?} vs {:?}",
        reference.dimensions(),
        candidate.dimensions()
    );
    let (width, height) = reference.dimensions();
    ensure!(
        width >= SSIM_WINDOW && height >= SSIM_WINDOW,
        "buffers {width}x{height} smaller than the {SSIM_WINDOW}x{SSIM_WINDOW} SSIM window"
    );

    let a = reference.as_raw();
    let b = candidate.as_raw();
    let w = width as usize;
    let win = SSIM_WINDOW as usize;
    let n = (win * win) as f64;
    // Unbiased covariance normalization over each window.
    let cov_norm = n / (n - 1.0);

    let mut total = 0.0f64;
    let mut windows = 0u64;

    for y0 in 0..=(height as usize - win) {
        for x0 in 0..=(width as usize - win) {
            let mut sum_a = 0.0f64;
            let mut sum_b = 0.0f64;
            let mut sum_aa = 0.0f64;
            let mut sum_bb = 0.0f64;
            let mut sum_ab = 0.0f64;

            for row in y0..y0 + win {
                let base = row * w + x0;
                for i in base..base + win {
                    let va = f64::from(a[i]);
                    let vb = f64::from(b[i]);
                    sum_a += va;
                    sum_b += vb;
                    sum_aa += va * va;
                    sum_bb += vb * vb;
                    sum_ab += va * vb;
                }
            }

            let mu_a = sum_a / n;
            let mu_b = sum_b / n;
            let var_a = cov_norm * (sum_aa / n - mu_a * mu_a);
            let var_b = cov_norm * (sum_bb / n - mu_b * mu_b);
            let cov_ab = cov_norm * (sum_ab / n - mu_a * mu_b);

            let numerator = (2.0 * mu_a * mu_b + C1) * (2.0 * cov_ab + C2);
            let denominator = (mu_a * mu_a + mu_b * mu_b + C1) * (var_a + var_b + C2);

            total += numerator / denominator;
            windows += 1;
        }
    }

    Ok(total / windows as f64)
}

/// Structural score used by the pipeline: Canny both crops with the shared
/// hysteresis pair, compare the edge maps, round to two decimal places.
pub fn edge_ssim(
    reference: &GrayImage,
    candidate: &GrayImage,
    low: f32,
    high: f32,
) -> Result<f64> {
    let ref_edges = canny(reference, low, high);
    let cand_edges = canny(candidate, low, high);
    let score = windowed_ssim(&ref_edges, &cand_edges)?;
    Ok(round2(score))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
