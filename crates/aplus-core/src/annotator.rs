//! Remote vision annotation seam.
//!
//! The content rule engine only needs "image bytes in, annotations out". The
//! HTTP client lives in `aplus-plugins`; tests and the CLI can plug in any
//! other implementation.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::RemoteServiceError;
use crate::models::VisionAnnotations;

/// Annotates exactly one image with text, logo, object and label detections.
#[async_trait]
pub trait VisionAnnotator: Send + Sync + Debug {
    /// Provider identifier used in logs
    fn name(&self) -> &str;

    /// Annotate a single image.
    ///
    /// Implementations must bound their own network time; an expired call is
    /// reported as [`RemoteServiceError::Timeout`].
    async fn annotate(&self, image: &[u8]) -> Result<VisionAnnotations, RemoteServiceError>;
}
