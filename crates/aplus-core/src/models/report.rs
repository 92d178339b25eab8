use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::finding::{Finding, FindingCode};
use super::image::ColorSpace;

pub const SERVER_ERROR_MESSAGE: &str = "Failed to process image";

/// Overall verdict of a compliance report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compliance {
    Pass,
    Fail,
    Error,
}

/// Measurements behind the verdict. Decimal values are fixed-point strings
/// so the JSON is stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    pub width: u32,
    pub height: u32,
    #[schema(example = "1.00")]
    pub aspect_ratio: String,
    pub file_size: usize,
    #[schema(example = "0.9800")]
    pub edge_white_ratio: String,
    #[schema(example = "0.2100")]
    pub center_white_ratio: String,
    #[schema(example = "0.7900")]
    pub product_coverage: String,
    #[schema(example = "jpg")]
    pub format: String,
    pub sample_width: u32,
    pub sample_height: u32,
    pub color_space: ColorSpace,
}

/// Echo of the upload the report describes
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportMeta {
    pub filename: String,
    pub mimetype: String,
    pub size: usize,
}

/// Result of one analysis. Built once per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComplianceReport {
    pub compliance: Compliance,
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// Serialized as `{}` on error reports
    #[serde(serialize_with = "serialize_metrics")]
    #[schema(value_type = Object)]
    pub metrics: Option<ReportMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ReportMeta>,
}

fn serialize_metrics<S>(metrics: &Option<ReportMetrics>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match metrics {
        Some(metrics) => metrics.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

impl ComplianceReport {
    /// Assemble a report from the issue and warning buckets.
    ///
    /// The verdict depends only on whether `issues` is empty. A finding keeps
    /// the bucket it was emitted into even if it was later reclassified.
    pub fn assemble(
        issues: Vec<Finding>,
        warnings: Vec<Finding>,
        metrics: ReportMetrics,
        meta: ReportMeta,
    ) -> Self {
        let compliance = if issues.is_empty() {
            Compliance::Pass
        } else {
            Compliance::Fail
        };
        Self {
            compliance,
            issues,
            warnings,
            metrics: Some(metrics),
            meta: Some(meta),
        }
    }

    /// `ERROR` report. `details` should be `None` in production.
    pub fn server_error(details: Option<String>) -> Self {
        let mut finding = Finding::issue(FindingCode::ServerError, SERVER_ERROR_MESSAGE);
        if let Some(details) = details {
            finding = finding.with_details(serde_json::Value::String(details));
        }
        Self {
            compliance: Compliance::Error,
            issues: vec![finding],
            warnings: Vec::new(),
            metrics: None,
            meta: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.compliance == Compliance::Pass
    }
}
