//! Domain models for the compliance pipeline

mod finding;
mod image;
mod report;
mod vision;

pub use finding::{Finding, FindingCode, Severity};
pub use image::{ColorSpace, ImageMetadata, UploadedImage};
pub use report::{Compliance, ComplianceReport, ReportMeta, ReportMetrics};
pub use vision::{EntityAnnotation, LocalizedObject, VisionAnnotations};
