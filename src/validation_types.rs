//! Outcome types for format validation.
//!
//! A validation call produces exactly one [`ValidationResult`]: either an
//! acceptance carrying the structural similarity score, or a rejection carrying
//! a stable machine-readable [`ReasonCode`]. Rejections are values, not errors:
//! undecodable or out-of-band inputs are expected and fully recoverable by the
//! caller.

use serde::Serialize;
use std::fmt;

/// Stable reason-code vocabulary emitted on rejection.
///
/// The serialized strings are a wire contract with downstream consumers and
/// must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// No image bytes were provided. Emitted by the calling boundary only,
    /// never by the pipeline itself.
    NoImage,
    ImageReadError,
    LowResolution,
    ImageTooDark,
    ImageTooBright,
    ImageTooBlurry,
    /// Aspect ratio deviates from the reference template beyond tolerance.
    AspectRatioMismatch,
    /// Aspect ratio falls outside the absolute band of a screenshot profile.
    InvalidScreenshotRatio,
    OverlayDetected,
    TemplateDiffTooHigh,
    FormatMismatch,
    NoTextStructure,
    SystemError,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::NoImage => "NO_IMAGE",
            ReasonCode::ImageReadError => "IMAGE_READ_ERROR",
            ReasonCode::LowResolution => "LOW_RESOLUTION",
            ReasonCode::ImageTooDark => "IMAGE_TOO_DARK",
            ReasonCode::ImageTooBright => "IMAGE_TOO_BRIGHT",
            ReasonCode::ImageTooBlurry => "IMAGE_TOO_BLURRY",
            ReasonCode::AspectRatioMismatch => "ASPECT_RATIO_MISMATCH",
            ReasonCode::InvalidScreenshotRatio => "INVALID_SCREENSHOT_RATIO",
            ReasonCode::OverlayDetected => "OVERLAY_DETECTED",
            ReasonCode::TemplateDiffTooHigh => "TEMPLATE_DIFF_TOO_HIGH",
            ReasonCode::FormatMismatch => "FORMAT_MISMATCH",
            ReasonCode::NoTextStructure => "NO_TEXT_STRUCTURE",
            ReasonCode::SystemError => "SYSTEM_ERROR",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged outcome of one validation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// The image conforms to the active profile. `similarity` carries the
    /// structural score for template-relative profiles and is absent for
    /// screenshot-only profiles, which run no structural comparison.
    Accepted { similarity: Option<f64> },
    /// The image was rejected at one of the gates. `similarity` is present
    /// only when the pipeline reached the structural-comparison stage.
    Rejected {
        reason: ReasonCode,
        similarity: Option<f64>,
        /// Diagnostic text, populated for `SYSTEM_ERROR` rejections.
        detail: Option<String>,
    },
}

impl ValidationResult {
    pub fn accepted(similarity: Option<f64>) -> Self {
        ValidationResult::Accepted { similarity }
    }

    pub fn rejected(reason: ReasonCode) -> Self {
        ValidationResult::Rejected {
            reason,
            similarity: None,
            detail: None,
        }
    }

    pub fn rejected_with_score(reason: ReasonCode, similarity: f64) -> Self {
        ValidationResult::Rejected {
            reason,
            similarity: Some(similarity),
            detail: None,
        }
    }

    pub fn system_error(detail: impl Into<String>) -> Self {
        ValidationResult::Rejected {
            reason: ReasonCode::SystemError,
            similarity: None,
            detail: Some(detail.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted { .. })
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            ValidationResult::Accepted { .. } => None,
            ValidationResult::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub fn similarity(&self) -> Option<f64> {
        match self {
            ValidationResult::Accepted { similarity } => *similarity,
            ValidationResult::Rejected { similarity, .. } => *similarity,
        }
    }

    /// Serializable report matching the service JSON shape
    /// (`ok` / `reason` / `similarity` / `msg`).
    pub fn report(&self) -> ValidationReport {
        match self {
            ValidationResult::Accepted { similarity } => ValidationReport {
                ok: true,
                reason: None,
                similarity: *similarity,
                msg: None,
            },
            ValidationResult::Rejected {
                reason,
                similarity,
                detail,
            } => ValidationReport {
                ok: false,
                reason: Some(*reason),
                similarity: *similarity,
                msg: detail.clone(),
            },
        }
    }
}

/// Flattened, serializable view of a [`ValidationResult`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}
