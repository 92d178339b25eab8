//! A+ Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! vision annotation seam shared across all A+ compliance components.

pub mod annotator;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use annotator::VisionAnnotator;
pub use config::{AnalyzerConfig, BaseConfig, Config, ServiceConfig, VisionConfig};
pub use error::{AnalysisError, AppError, ErrorMetadata, LogLevel, RemoteServiceError};
pub use models::{
    ColorSpace, Compliance, ComplianceReport, Finding, FindingCode, ImageMetadata, ReportMeta,
    ReportMetrics, Severity, UploadedImage, VisionAnnotations,
};
