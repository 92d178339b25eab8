//! Background and coverage analyzer
//!
//! Works on the downscaled RGBA sample. Every pixel is either an edge pixel
//! (within `edge_threshold_fraction` of any border) or a center pixel; the
//! partition depends only on the coordinate. Alpha is ignored.

use aplus_core::{AnalyzerConfig, Finding, FindingCode};
use image::RgbaImage;
use serde_json::json;

use super::{percent, RuleFindings};

/// Whiteness statistics of one sample
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundStats {
    pub sample_width: u32,
    pub sample_height: u32,
    pub edge_pixels: usize,
    pub center_pixels: usize,
    pub edge_white_ratio: f64,
    /// 1.0 when the sample has no center pixels
    pub center_white_ratio: f64,
    /// Unweighted mean RGB over edge pixels
    pub average_edge_color: [f64; 3],
}

impl BackgroundStats {
    pub fn edge_brightness(&self) -> f64 {
        self.average_edge_color.iter().sum::<f64>() / 3.0
    }

    /// Estimated fraction of the frame occupied by the product
    pub fn coverage(&self) -> f64 {
        1.0 - self.center_white_ratio
    }

    /// `RGB(r, g, b)` with rounded channels
    pub fn average_edge_color_label(&self) -> String {
        let [r, g, b] = self.average_edge_color;
        format!("RGB({}, {}, {})", r.round(), g.round(), b.round())
    }
}

/// The three conditions a white background must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundVerdict {
    pub is_white_enough: bool,
    pub is_bright_enough: bool,
    pub is_center_different: bool,
}

impl BackgroundVerdict {
    pub fn from_stats(stats: &BackgroundStats, config: &AnalyzerConfig) -> Self {
        Self {
            is_white_enough: stats.edge_white_ratio >= config.min_edge_white_ratio,
            is_bright_enough: stats.edge_brightness() >= config.min_edge_brightness,
            is_center_different: stats.center_white_ratio < config.max_center_white_ratio,
        }
    }

    pub fn is_white(&self) -> bool {
        self.is_white_enough && self.is_bright_enough && self.is_center_different
    }
}

pub fn is_white_pixel(rgb: [u8; 3], tolerance: u8) -> bool {
    rgb.iter().all(|&c| 255 - c <= tolerance)
}

pub fn is_edge_pixel(x: u32, y: u32, width: u32, height: u32, fraction: f64) -> bool {
    let (x, y) = (x as f64, y as f64);
    let (w, h) = (width as f64, height as f64);
    x < w * fraction || x > w * (1.0 - fraction) || y < h * fraction || y > h * (1.0 - fraction)
}

/// Collect whiteness statistics over the sample.
pub fn measure(sample: &RgbaImage, config: &AnalyzerConfig) -> BackgroundStats {
    let (width, height) = sample.dimensions();
    let fraction = config.edge_threshold_fraction;
    let tolerance = config.white_tolerance;

    let mut edge_pixels = 0usize;
    let mut edge_white = 0usize;
    let mut center_pixels = 0usize;
    let mut center_white = 0usize;
    let mut edge_sum = [0u64; 3];

    for (x, y, pixel) in sample.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        let white = is_white_pixel([r, g, b], tolerance);

        if is_edge_pixel(x, y, width, height, fraction) {
            edge_pixels += 1;
            edge_white += usize::from(white);
            edge_sum[0] += u64::from(r);
            edge_sum[1] += u64::from(g);
            edge_sum[2] += u64::from(b);
        } else {
            center_pixels += 1;
            center_white += usize::from(white);
        }
    }

    let ratio = |part: usize, whole: usize, empty: f64| {
        if whole == 0 {
            empty
        } else {
            part as f64 / whole as f64
        }
    };
    let mean = |sum: u64| ratio(sum as usize, edge_pixels, 0.0);

    BackgroundStats {
        sample_width: width,
        sample_height: height,
        edge_pixels,
        center_pixels,
        edge_white_ratio: ratio(edge_white, edge_pixels, 0.0),
        center_white_ratio: ratio(center_white, center_pixels, 1.0),
        average_edge_color: [mean(edge_sum[0]), mean(edge_sum[1]), mean(edge_sum[2])],
    }
}

/// Background and coverage findings for measured statistics.
pub fn evaluate(stats: &BackgroundStats, config: &AnalyzerConfig) -> RuleFindings {
    let mut findings = RuleFindings::default();
    let verdict = BackgroundVerdict::from_stats(stats, config);

    if !verdict.is_white() {
        findings.push(
            Finding::issue(
                FindingCode::BackgroundColor,
                "Main image must have a clean white background (RGB close to 255,255,255).",
            )
            .with_details(json!({
                "edgeWhiteRatio": percent(stats.edge_white_ratio),
                "averageEdgeColor": stats.average_edge_color_label(),
                "centerWhiteRatio": percent(stats.center_white_ratio),
                "isWhiteEnough": verdict.is_white_enough,
                "isBrightEnough": verdict.is_bright_enough,
                "isCenterDifferent": verdict.is_center_different,
            })),
        );
    } else if stats.edge_white_ratio < config.clean_edge_white_ratio {
        findings.push(
            Finding::warning(
                FindingCode::BackgroundQuality,
                "Background has some non-white pixels. For best results, use a cleaner white background.",
            )
            .with_details(json!({
                "edgeWhiteRatio": percent(stats.edge_white_ratio),
                "averageEdgeColor": stats.average_edge_color_label(),
            })),
        );
    }

    let coverage = stats.coverage();
    let target = config.target_coverage * 100.0;
    let details = json!({
        "coverage": percent(coverage),
        "recommended": format!(
            "{:.0}-{:.0}%",
            config.min_coverage * 100.0,
            (config.target_coverage + config.coverage_tolerance) * 100.0
        ),
    });
    let current = (coverage * 100.0).round();

    if coverage < config.min_coverage {
        findings.push(
            Finding::issue(
                FindingCode::ProductCoverage,
                format!(
                    "Product should cover approximately {:.0}% of the image (currently {:.0}%).",
                    target, current
                ),
            )
            .with_details(details),
        );
    } else if (coverage - config.target_coverage).abs() > config.coverage_tolerance {
        findings.push(
            Finding::warning(
                FindingCode::ProductCoverageOptimal,
                format!(
                    "For best results, product should cover approximately {:.0}% of the image (currently {:.0}%).",
                    target, current
                ),
            )
            .with_details(details),
        );
    }

    findings
}
