//! # receipt-gate
//!
//! Deterministic format validation for submitted receipt images: decide,
//! without human review, whether a capture visually conforms to a known
//! reference layout before any downstream text extraction or financial action
//! occurs. Edited, mismatched, blurry, and overlaid screenshots are rejected
//! cheaply with a stable machine-readable reason code.
//!
//! The pipeline is a fixed chain of gates over grayscale pixel buffers:
//! decode, photometric quality, aspect ratio, alignment to the template,
//! overlay/watermark detection, coarse mean difference, and an edge-domain
//! structural similarity score. The first failing gate wins.
//!
//! ## Example
//!
//! ```rust,no_run
//! use receipt_gate::{ReferenceTemplate, ValidationConfig, Validator};
//! use std::path::Path;
//!
//! let template = ReferenceTemplate::load(Path::new("template_v1.jpg"))?;
//! let validator = Validator::new(Some(template));
//!
//! let bytes = std::fs::read("uploaded_receipt.jpg")?;
//! let result = validator.validate(&bytes, &ValidationConfig::strict_template());
//! println!("{}", serde_json::to_string(&result.report())?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod decode;
pub mod diff;
pub mod edges;
pub mod geometry;
pub mod pipeline;
pub mod quality;
pub mod region;
pub mod ssim;
pub mod template;
pub mod validation_types;

pub use config::{
    BrightnessBounds, ComparisonPolicy, GeometryPolicy, OverlayPolicy, QualityPolicy,
    TextStructurePolicy, ValidationConfig,
};
pub use pipeline::Validator;
pub use region::Region;
pub use template::ReferenceTemplate;
pub use validation_types::{ReasonCode, ValidationReport, ValidationResult};
