//! A+ Processing Library
//!
//! Image decoding, the compliance rule engines and the analyzer that assembles
//! them into a [`ComplianceReport`](aplus_core::ComplianceReport).

pub mod analysis;
pub mod compliance;
pub mod image;
pub mod validator;

pub use analysis::RuleFindings;
pub use compliance::ComplianceAnalyzer;
pub use image::{DecodedImage, ImageProcessor};
pub use validator::{normalize_content_type, IngressError, IngressValidator};
