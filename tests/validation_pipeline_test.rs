//! End-to-end pipeline properties: gate ordering, precedence, and the
//! acceptance boundary, exercised through `Validator::validate` with synthetic
//! receipt-like fixtures.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use receipt_gate::{
    ReasonCode, ReferenceTemplate, ValidationConfig, ValidationResult, Validator,
};
use std::io::Cursor;

const BG: u8 = 245;
const INK: u8 = 15;

/// Receipt-like fixture: ruled dark lines on a light background.
fn receipt_like(width: u32, height: u32, period: u32, thickness: u32, vertical: bool) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let pos = if vertical { x } else { y };
        if pos >= 30 && (pos - 30) % period < thickness {
            Luma([INK])
        } else {
            Luma([BG])
        }
    })
}

fn template_image() -> GrayImage {
    receipt_like(400, 600, 60, 3, false)
}

fn encode_png(img: &GrayImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn strict_validator() -> Validator {
    Validator::new(Some(
        ReferenceTemplate::from_image(template_image()).unwrap(),
    ))
}

#[test]
fn test_template_accepts_itself() {
    let validator = strict_validator();
    let bytes = encode_png(&template_image());

    let result = validator.validate(&bytes, &ValidationConfig::strict_template());
    match result {
        ValidationResult::Accepted { similarity } => {
            let score = similarity.expect("strict profile must report similarity");
            assert!(
                score >= 0.80,
                "self-similarity {score} below acceptance threshold"
            );
        }
        other => panic!("template rejected against itself: {other:?}"),
    }
}

#[test]
fn test_similarity_exactly_at_threshold_is_accepted() {
    let validator = strict_validator();
    let bytes = encode_png(&template_image());

    // A byte-identical candidate scores 1.0; raising the threshold to exactly
    // that score must still accept (comparison is inclusive).
    let mut config = ValidationConfig::strict_template();
    config.comparison.as_mut().unwrap().ssim_threshold = 1.0;

    let result = validator.validate(&bytes, &config);
    assert!(result.is_accepted(), "inclusive boundary violated: {result:?}");
    assert_eq!(result.similarity(), Some(1.0));
}

#[test]
fn test_non_image_bytes_rejected_as_read_error() {
    let validator = strict_validator();
    let result = validator.validate(
        b"this is not an encoded image",
        &ValidationConfig::strict_template(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::ImageReadError));
    assert_eq!(result.similarity(), None);
}

#[test]
fn test_aspect_mismatch_dominates_pixel_content() {
    let validator = strict_validator();
    // Square crop of otherwise template-like content: geometry gate wins
    // regardless of what the pixels look like.
    let square = receipt_like(400, 400, 60, 3, false);
    let result = validator.validate(&encode_png(&square), &ValidationConfig::strict_template());
    assert_eq!(result.reason(), Some(ReasonCode::AspectRatioMismatch));
}

#[test]
fn test_overlay_takes_precedence_over_structural_score() {
    let validator = strict_validator();

    // Paste a hard-edged bordered box into the watermark zone of an otherwise
    // perfect candidate. The structural score over the content region would
    // still pass; the overlay gate must reject first.
    let mut candidate = template_image();
    for y in 225..330u32 {
        for x in 135..265u32 {
            let on_border = y < 230 || y >= 325 || x < 140 || x >= 260;
            let value = if on_border { 0 } else { 255 };
            candidate.put_pixel(x, y, Luma([value]));
        }
    }

    let result = validator.validate(
        &encode_png(&candidate),
        &ValidationConfig::strict_template(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::OverlayDetected));
    // The structural stage never ran.
    assert_eq!(result.similarity(), None);
}

#[test]
fn test_gross_mismatch_rejected_by_difference_gate() {
    let validator = strict_validator();

    // Inverted capture: edge layout identical, intensities wildly off.
    let template = template_image();
    let inverted = GrayImage::from_fn(400, 600, |x, y| Luma([255 - template.get_pixel(x, y)[0]]));

    let result = validator.validate(
        &encode_png(&inverted),
        &ValidationConfig::strict_template(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::TemplateDiffTooHigh));
}

#[test]
fn test_wrong_layout_rejected_as_format_mismatch() {
    let validator = strict_validator();

    // Same ink coverage but vertical ruling: the coarse diff stays under the
    // limit while the edge structure disagrees everywhere.
    let rotated_layout = receipt_like(400, 600, 60, 3, true);
    let result = validator.validate(
        &encode_png(&rotated_layout),
        &ValidationConfig::strict_template(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::FormatMismatch));
    let score = result
        .similarity()
        .expect("structural stage was reached, score must be present");
    assert!(score < 0.80, "mismatched layout scored {score}");
}

#[test]
fn test_quality_gate_runs_before_geometry_gate() {
    let validator = Validator::new(None);
    // Fails both resolution (100 < 320) and the aspect band (1.0 > 0.65);
    // the quality reason must win.
    let tiny = GrayImage::from_pixel(100, 100, Luma([128u8]));
    let result = validator.validate(
        &encode_png(&tiny),
        &ValidationConfig::relaxed_screenshot(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::LowResolution));
}

#[test]
fn test_all_black_image_rejected_as_too_dark() {
    let validator = Validator::new(None);
    // Decodes fine, passes resolution, then fails brightness before any
    // geometric or structural stage runs.
    let black = GrayImage::from_pixel(480, 960, Luma([0u8]));
    let result = validator.validate(
        &encode_png(&black),
        &ValidationConfig::relaxed_screenshot(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::ImageTooDark));
}

#[test]
fn test_screenshot_profile_accepts_structured_capture() {
    let validator = Validator::new(None);
    let screenshot = receipt_like(480, 960, 60, 6, false);
    let result = validator.validate(
        &encode_png(&screenshot),
        &ValidationConfig::relaxed_screenshot(),
    );
    // Screenshot profiles run no structural comparison and report no score.
    assert_eq!(result, ValidationResult::Accepted { similarity: None });
}

#[test]
fn test_blank_body_rejected_for_missing_text_structure() {
    let validator = Validator::new(None);

    // Sharp checker patch in the top-left corner keeps the blur gate happy;
    // the content region itself is blank.
    let img = GrayImage::from_fn(480, 960, |x, y| {
        if x < 44 && y < 96 {
            if (x / 2 + y / 2) % 2 == 0 {
                Luma([INK])
            } else {
                Luma([BG])
            }
        } else {
            Luma([BG])
        }
    });

    let result = validator.validate(
        &encode_png(&img),
        &ValidationConfig::relaxed_screenshot(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::NoTextStructure));
}

#[test]
fn test_dark_screenshot_profile_accepts_dark_theme() {
    let validator = Validator::new(None);
    // Dark UI: light text lines on a dark background.
    let dark = GrayImage::from_fn(480, 960, |_, y| {
        if y >= 30 && (y - 30) % 60 < 6 {
            Luma([180u8])
        } else {
            Luma([15u8])
        }
    });
    let result = validator.validate(&encode_png(&dark), &ValidationConfig::dark_screenshot());
    assert!(result.is_accepted(), "dark capture rejected: {result:?}");

    // The same capture is too dark for the relaxed profile.
    let relaxed = validator.validate(&encode_png(&dark), &ValidationConfig::relaxed_screenshot());
    assert_eq!(relaxed.reason(), Some(ReasonCode::ImageTooDark));
}

#[test]
fn test_brightness_drift_does_not_disturb_structural_score() {
    let validator = strict_validator();
    // Uniform brightness offset: the coarse diff sees it, the edge-domain
    // structural score must not.
    let template = template_image();
    let brighter =
        GrayImage::from_fn(400, 600, |x, y| Luma([template.get_pixel(x, y)[0].saturating_add(10)]));

    let result = validator.validate(&encode_png(&brighter), &ValidationConfig::strict_template());
    match result {
        ValidationResult::Accepted { similarity } => {
            assert_eq!(similarity, Some(1.0), "edge maps should be unchanged");
        }
        other => panic!("brightness-shifted capture rejected: {other:?}"),
    }
}

#[test]
fn test_half_size_capture_is_aligned_before_comparison() {
    let validator = strict_validator();
    // Half-size inverted capture: correct aspect, so the aligner resizes it to
    // template dimensions and the comparison stage runs (and rejects on the
    // gross intensity mismatch). Proves region coordinates stay valid after
    // alignment.
    let inverted_half = GrayImage::from_fn(200, 300, |_, y| {
        if y >= 15 && (y - 15) % 60 < 3 {
            Luma([255 - INK])
        } else {
            Luma([255 - BG])
        }
    });

    let result = validator.validate(
        &encode_png(&inverted_half),
        &ValidationConfig::strict_template(),
    );
    assert_eq!(result.reason(), Some(ReasonCode::TemplateDiffTooHigh));
}
