//! Technical rule engine. Pure function of the metadata and declared format.

use aplus_core::{AnalyzerConfig, ColorSpace, Finding, FindingCode, ImageMetadata};

use super::RuleFindings;

const ALLOWED_FORMATS: &[&str] = &["jpg", "jpeg"];

/// Evaluate every technical rule. All matching rules fire.
pub fn evaluate(
    metadata: &ImageMetadata,
    declared_format: &str,
    config: &AnalyzerConfig,
) -> RuleFindings {
    let mut findings = RuleFindings::default();

    if !ALLOWED_FORMATS.contains(&declared_format) {
        findings.push(Finding::issue(
            FindingCode::InvalidFormat,
            "Main image must be in JPEG format (RGB color mode, .jpg or .jpeg).",
        ));
    }

    let (min, max) = config.size_bounds;
    let longest = metadata.longest_side();
    if longest < min || longest > max {
        findings.push(Finding::issue(
            FindingCode::InvalidSize,
            format!(
                "Main image must be between {min}x{min} and {max}x{max} pixels.",
                min = min,
                max = max
            ),
        ));
    }

    let ratio = metadata.aspect_ratio();
    let (square_min, square_max) = config.square_ratio;
    if !(square_min..=square_max).contains(&ratio) {
        findings.push(Finding::warning(
            FindingCode::AspectRatio,
            "For best results, use a square image (1:1 aspect ratio).",
        ));
    }

    if metadata.color_space.is_known() && metadata.color_space != ColorSpace::Srgb {
        findings.push(Finding::issue(
            FindingCode::ColorMode,
            "Image must be in RGB color mode (not CMYK).",
        ));
    }

    findings
}
