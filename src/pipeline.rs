//! The validation pipeline sequencer.
//!
//! Pure ordering, no independent logic: decode, quality gate, geometry gate,
//! alignment, overlay gate, text-structure gate, coarse difference, structural
//! score. The first failing gate wins and later stages are not evaluated. Any
//! unexpected internal fault (malformed configuration, dimension mismatch
//! after resize) is caught at this boundary and surfaced as a `SYSTEM_ERROR`
//! rejection, never a panic in the calling process.

use crate::config::ValidationConfig;
use crate::decode::decode_gray;
use crate::diff::mean_abs_diff;
use crate::edges::{check_overlay, check_text_structure};
use crate::geometry::check_aspect;
use crate::quality::check_quality;
use crate::region::{crop, pre_blur};
use crate::ssim::edge_ssim;
use crate::template::ReferenceTemplate;
use crate::validation_types::{ReasonCode, ValidationResult};
use anyhow::{ensure, Context, Result};
use image::imageops::{resize, FilterType};
use image::GrayImage;
use log::{debug, error};

/// Stateless validator bound to the process-wide reference template.
///
/// `validate` takes `&self` and allocates only call-scoped buffers, so one
/// instance is safe to share across any number of threads without locking.
pub struct Validator {
    template: Option<ReferenceTemplate>,
}

impl Validator {
    pub fn new(template: Option<ReferenceTemplate>) -> Self {
        Validator { template }
    }

    /// Validate one candidate image against the given profile.
    ///
    /// Input-data failures come back as specific `Rejected` values; internal
    /// faults become a `SYSTEM_ERROR` rejection with a diagnostic message.
    pub fn validate(&self, bytes: &[u8], config: &ValidationConfig) -> ValidationResult {
        match self.run(bytes, config) {
            Ok(result) => result,
            Err(e) => {
                error!("validation failed internally: {e:#}");
                ValidationResult::system_error(format!("{e:#}"))
            }
        }
    }

    fn run(&self, bytes: &[u8], config: &ValidationConfig) -> Result<ValidationResult> {
        debug!("validating {} bytes with profile {}", bytes.len(), config.profile);

        let candidate = match decode_gray(bytes) {
            Ok(image) => image,
            Err(e) => {
                debug!("decode failed: {e}");
                return Ok(ValidationResult::rejected(ReasonCode::ImageReadError));
            }
        };

        if let Some(reason) = check_quality(&candidate, &config.quality)? {
            return Ok(ValidationResult::rejected(reason));
        }

        let reference = if config.requires_template() {
            Some(self.template.as_ref().with_context(|| {
                format!(
                    "profile {} requires a reference template but none is loaded",
                    config.profile
                )
            })?)
        } else {
            None
        };

        let reference_ratio = reference.map(ReferenceTemplate::aspect_ratio);
        if let Some(reason) = check_aspect(
            candidate.width(),
            candidate.height(),
            &config.geometry,
            reference_ratio,
        )? {
            return Ok(ValidationResult::rejected(reason));
        }

        // Align to template dimensions so region coordinates computed against
        // the template are valid on the candidate too. Screenshot profiles
        // resolve regions against the candidate's own dimensions instead.
        let aligned = match reference {
            Some(template) => align(candidate, template),
            None => candidate,
        };

        if let Some(policy) = &config.overlay {
            if let Some(reason) =
                check_overlay(&aligned, policy, config.edge_low, config.edge_high)?
            {
                return Ok(ValidationResult::rejected(reason));
            }
        }

        if let Some(policy) = &config.text_structure {
            if let Some(reason) =
                check_text_structure(&aligned, policy, config.edge_low, config.edge_high)?
            {
                return Ok(ValidationResult::rejected(reason));
            }
        }

        let Some(comparison) = &config.comparison else {
            return Ok(ValidationResult::accepted(None));
        };
        let template = reference.context("comparison configured without a template")?;
        ensure!(
            aligned.dimensions() == template.image().dimensions(),
            "dimension mismatch after resize: {:?} vs {:?}",
            aligned.dimensions(),
            template.image().dimensions()
        );

        let rect = comparison
            .content_region
            .resolve(template.width(), template.height())?;
        let mut ref_crop = crop(template.image(), &rect);
        let mut cand_crop = crop(&aligned, &rect);
        if let Some(sigma) = comparison.pre_blur_sigma {
            ref_crop = pre_blur(&ref_crop, sigma);
            cand_crop = pre_blur(&cand_crop, sigma);
        }

        if let Some(limit) = comparison.diff_limit {
            let diff = mean_abs_diff(&ref_crop, &cand_crop)?;
            debug!("difference gate: mean diff {diff:.2}, limit {limit:.2}");
            if diff > limit {
                return Ok(ValidationResult::rejected(ReasonCode::TemplateDiffTooHigh));
            }
        }

        let score = edge_ssim(&ref_crop, &cand_crop, config.edge_low, config.edge_high)?;
        debug!(
            "structural gate: score {score:.2}, threshold {:.2}",
            comparison.ssim_threshold
        );
        if score >= comparison.ssim_threshold {
            Ok(ValidationResult::accepted(Some(score)))
        } else {
            Ok(ValidationResult::rejected_with_score(
                ReasonCode::FormatMismatch,
                score,
            ))
        }
    }
}

/// Bilinear resize to the template's exact dimensions. Deterministic; a no-op
/// when the candidate already matches.
fn align(candidate: GrayImage, template: &ReferenceTemplate) -> GrayImage {
    let (width, height) = (template.width(), template.height());
    if candidate.dimensions() == (width, height) {
        return candidate;
    }
    debug!(
        "aligning {}x{} candidate to {width}x{height}",
        candidate.width(),
        candidate.height()
    );
    resize(&candidate, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_align_is_identity_for_matching_dimensions() {
        let img = GrayImage::from_fn(40, 60, |x, y| Luma([((x + y) % 251) as u8]));
        let template = ReferenceTemplate::from_image(img.clone()).unwrap();
        let aligned = align(img.clone(), &template);
        assert_eq!(aligned, img);
    }

    #[test]
    fn test_align_resizes_to_template() {
        let template =
            ReferenceTemplate::from_image(GrayImage::from_pixel(40, 60, Luma([128u8]))).unwrap();
        let candidate = GrayImage::from_pixel(80, 120, Luma([128u8]));
        let aligned = align(candidate, &template);
        assert_eq!(aligned.dimensions(), (40, 60));
    }

    #[test]
    fn test_template_required_profile_without_template_is_system_error() {
        let validator = Validator::new(None);
        let config = ValidationConfig::strict_template();

        // Valid PNG bytes so the failure is the missing template, not decode.
        let img = GrayImage::from_pixel(40, 60, Luma([200u8]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let result = validator.validate(&bytes, &config);
        assert_eq!(result.reason(), Some(ReasonCode::SystemError));
    }

    #[test]
    fn test_garbage_bytes_rejected_without_panic() {
        let validator = Validator::new(None);
        let config = ValidationConfig::relaxed_screenshot();
        let result = validator.validate(b"not an image at all", &config);
        assert_eq!(result.reason(), Some(ReasonCode::ImageReadError));
    }
}
