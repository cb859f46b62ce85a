//! Profile configuration for the validation pipeline.
//!
//! Every threshold the pipeline consults lives here, grouped per gate. The
//! deployed profiles are a small, named catalog; callers select exactly one
//! profile per call and profiles are never merged at runtime. A disabled check
//! is configuration-absent (`None`), never zero-thresholded.

use crate::region::Region;
use serde::Serialize;

/// Canny hysteresis pair shared by the overlay, text-structure, and structural
/// checks.
pub const DEFAULT_EDGE_LOW: f32 = 80.0;
pub const DEFAULT_EDGE_HIGH: f32 = 200.0;

/// Photometric and resolution checks run before any comparison is attempted.
///
/// Checks run in a fixed order (resolution, brightness, blur) and the first
/// failing check determines the rejection reason.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityPolicy {
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub brightness: Option<BrightnessBounds>,
    /// Minimum Laplacian-variance blur score.
    pub min_blur_variance: Option<f64>,
}

impl QualityPolicy {
    pub fn is_enabled(&self) -> bool {
        self.min_width.is_some()
            || self.min_height.is_some()
            || self.brightness.is_some()
            || self.min_blur_variance.is_some()
    }
}

/// Mean-intensity bounds, optionally restricted to a sub-region.
#[derive(Debug, Clone, Serialize)]
pub struct BrightnessBounds {
    pub min: f64,
    pub max: f64,
    /// When absent the mean is taken over the whole image.
    pub region: Option<Region>,
}

/// Aspect-ratio gate. Must run before alignment, since resizing to template
/// dimensions would silently erase genuine aspect mismatches.
#[derive(Debug, Clone, Serialize)]
pub enum GeometryPolicy {
    /// `|ratio_ref - ratio_img| <= tolerance`, against the loaded template.
    TemplateRelative { tolerance: f64 },
    /// `min <= ratio_img <= max`, no template involved (screenshot profiles).
    AbsoluteBand { min: f64, max: f64 },
}

/// Edge-density check over the watermark zone of the aligned candidate.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayPolicy {
    pub region: Region,
    /// Maximum mean edge intensity before the zone is considered overlaid.
    pub edge_limit: f64,
}

/// Minimum edge density over the content region; a receipt body with less
/// structure than this carries no legible text.
#[derive(Debug, Clone, Serialize)]
pub struct TextStructurePolicy {
    pub region: Region,
    pub min_edge_density: f64,
}

/// Template-relative comparison: coarse mean-difference check followed by the
/// edge-domain structural score.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonPolicy {
    pub content_region: Region,
    /// Gaussian sigma applied to both crops before diff/structural scoring.
    /// Absent disables the pre-blur.
    pub pre_blur_sigma: Option<f32>,
    /// Maximum mean absolute pixel difference; absent skips the coarse check.
    pub diff_limit: Option<f64>,
    /// Minimum structural similarity score, compared inclusively (`>=`).
    pub ssim_threshold: f64,
}

/// Immutable configuration for one deployed validation profile.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationConfig {
    pub profile: &'static str,
    pub quality: QualityPolicy,
    pub geometry: GeometryPolicy,
    pub overlay: Option<OverlayPolicy>,
    pub text_structure: Option<TextStructurePolicy>,
    pub comparison: Option<ComparisonPolicy>,
    pub edge_low: f32,
    pub edge_high: f32,
}

impl ValidationConfig {
    /// Whether this profile needs the process-wide reference template.
    pub fn requires_template(&self) -> bool {
        self.comparison.is_some()
            || matches!(self.geometry, GeometryPolicy::TemplateRelative { .. })
    }

    /// Strict template-match profile: the candidate must reproduce the
    /// reference layout. Carries the production constants of the original
    /// deployment.
    pub fn strict_template() -> Self {
        ValidationConfig {
            profile: "strict-template",
            quality: QualityPolicy::default(),
            geometry: GeometryPolicy::TemplateRelative { tolerance: 0.12 },
            overlay: Some(OverlayPolicy {
                region: Region::new(0.32, 0.36, 0.68, 0.56),
                edge_limit: 15.0,
            }),
            text_structure: None,
            comparison: Some(ComparisonPolicy {
                content_region: Region::new(0.22, 0.27, 0.78, 0.77),
                // Matches a 5x5 Gaussian kernel with auto sigma.
                pre_blur_sigma: Some(1.1),
                diff_limit: Some(30.0),
                ssim_threshold: 0.80,
            }),
            edge_low: DEFAULT_EDGE_LOW,
            edge_high: DEFAULT_EDGE_HIGH,
        }
    }

    /// Relaxed screenshot profile: no template, photometric gates plus a
    /// portrait-phone aspect band and a text-structure floor.
    pub fn relaxed_screenshot() -> Self {
        ValidationConfig {
            profile: "relaxed-screenshot",
            quality: QualityPolicy {
                min_width: Some(320),
                min_height: Some(480),
                brightness: Some(BrightnessBounds {
                    min: 40.0,
                    max: 245.0,
                    region: None,
                }),
                min_blur_variance: Some(100.0),
            },
            geometry: GeometryPolicy::AbsoluteBand {
                min: 0.40,
                max: 0.65,
            },
            overlay: None,
            text_structure: Some(TextStructurePolicy {
                region: Region::new(0.10, 0.15, 0.90, 0.85),
                min_edge_density: 1.0,
            }),
            comparison: None,
            edge_low: DEFAULT_EDGE_LOW,
            edge_high: DEFAULT_EDGE_HIGH,
        }
    }

    /// Dark-mode screenshot profile: same gates as the relaxed profile with
    /// brightness bounds shifted for dark UI themes.
    pub fn dark_screenshot() -> Self {
        ValidationConfig {
            profile: "dark-screenshot",
            quality: QualityPolicy {
                min_width: Some(320),
                min_height: Some(480),
                brightness: Some(BrightnessBounds {
                    min: 10.0,
                    max: 160.0,
                    region: None,
                }),
                min_blur_variance: Some(60.0),
            },
            geometry: GeometryPolicy::AbsoluteBand {
                min: 0.40,
                max: 0.65,
            },
            overlay: None,
            text_structure: Some(TextStructurePolicy {
                region: Region::new(0.10, 0.15, 0.90, 0.85),
                min_edge_density: 1.0,
            }),
            comparison: None,
            edge_low: DEFAULT_EDGE_LOW,
            edge_high: DEFAULT_EDGE_HIGH,
        }
    }

    /// Look up a profile by its deployed name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "strict-template" => Some(Self::strict_template()),
            "relaxed-screenshot" => Some(Self::relaxed_screenshot()),
            "dark-screenshot" => Some(Self::dark_screenshot()),
            _ => None,
        }
    }

    pub fn profile_names() -> &'static [&'static str] {
        &["strict-template", "relaxed-screenshot", "dark-screenshot"]
    }
}

/// Parse a similarity threshold (must be between 0.0 and 1.0).
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let val = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if !(0.0..=1.0).contains(&val) {
        return Err(format!("Must be between 0.0 and 1.0, got {val}"));
    }
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_profile_carries_production_constants() {
        let config = ValidationConfig::strict_template();
        assert!(config.requires_template());

        match config.geometry {
            GeometryPolicy::TemplateRelative { tolerance } => assert_eq!(tolerance, 0.12),
            _ => panic!("strict profile must be template-relative"),
        }

        let comparison = config.comparison.unwrap();
        assert_eq!(comparison.ssim_threshold, 0.80);
        assert_eq!(comparison.diff_limit, Some(30.0));

        let overlay = config.overlay.unwrap();
        assert_eq!(overlay.edge_limit, 15.0);

        // Quality checks are configuration-absent in the strict profile.
        assert!(!config.quality.is_enabled());
    }

    #[test]
    fn test_screenshot_profiles_do_not_need_template() {
        assert!(!ValidationConfig::relaxed_screenshot().requires_template());
        assert!(!ValidationConfig::dark_screenshot().requires_template());
    }

    #[test]
    fn test_profile_lookup_by_name() {
        for name in ValidationConfig::profile_names() {
            let config = ValidationConfig::by_name(name).unwrap();
            assert_eq!(&config.profile, name);
        }
        assert!(ValidationConfig::by_name("superset").is_none());
    }

    #[test]
    fn test_parse_threshold_bounds() {
        assert_eq!(parse_threshold("0.8"), Ok(0.8));
        assert_eq!(parse_threshold("1.0"), Ok(1.0));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("abc").is_err());
    }
}
