use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable code of a compliance finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    InvalidFormat,
    InvalidSize,
    AspectRatio,
    ColorMode,
    BackgroundColor,
    BackgroundQuality,
    ProductCoverage,
    ProductCoverageOptimal,
    TextDetected,
    LogoDetected,
    MultipleProducts,
    MannequinDetected,
    ShoeOrientation,
    VisionApiError,
    ServerError,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::InvalidFormat => "INVALID_FORMAT",
            FindingCode::InvalidSize => "INVALID_SIZE",
            FindingCode::AspectRatio => "ASPECT_RATIO",
            FindingCode::ColorMode => "COLOR_MODE",
            FindingCode::BackgroundColor => "BACKGROUND_COLOR",
            FindingCode::BackgroundQuality => "BACKGROUND_QUALITY",
            FindingCode::ProductCoverage => "PRODUCT_COVERAGE",
            FindingCode::ProductCoverageOptimal => "PRODUCT_COVERAGE_OPTIMAL",
            FindingCode::TextDetected => "TEXT_DETECTED",
            FindingCode::LogoDetected => "LOGO_DETECTED",
            FindingCode::MultipleProducts => "MULTIPLE_PRODUCTS",
            FindingCode::MannequinDetected => "MANNEQUIN_DETECTED",
            FindingCode::ShoeOrientation => "SHOE_ORIENTATION",
            FindingCode::VisionApiError => "VISION_API_ERROR",
            FindingCode::ServerError => "SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a finding fails compliance (`issue`) or is advisory (`warning`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Issue,
    Warning,
}

/// A single rule violation or advisory.
///
/// Findings are values: rules build them once and nothing mutates them
/// afterwards. Reclassification produces a new finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Finding {
    pub code: FindingCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub severity: Severity,
}

impl Finding {
    pub fn issue(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            severity: Severity::Issue,
        }
    }

    pub fn warning(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            severity: Severity::Warning,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Same finding with a new message and severity; code and details are kept.
    pub fn reclassified(self, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            ..self
        }
    }

    pub fn is_issue(&self) -> bool {
        self.severity == Severity::Issue
    }
}
