//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use aplus_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "A+ Image Compliance API",
        version = "0.1.0",
        description = "Checks a marketplace main product image against technical, background, coverage and content rules and returns a PASS/FAIL/ERROR report."
    ),
    paths(
        handlers::compliance::check_image_compliance,
        health::health_check,
    ),
    components(
        schemas(
            models::ComplianceReport,
            models::Compliance,
            models::Finding,
            models::FindingCode,
            models::Severity,
            models::ReportMetrics,
            models::ReportMeta,
            models::ColorSpace,
            error::ErrorResponse,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "compliance", description = "Main image compliance analysis"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_both_endpoints() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/webhook/image-compliance"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[test]
    fn test_openapi_has_report_schema() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.schemas.contains_key("ComplianceReport"));
        assert!(components.schemas.contains_key("ErrorResponse"));
    }
}
