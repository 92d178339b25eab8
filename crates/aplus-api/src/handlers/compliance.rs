use std::sync::Arc;

use aplus_core::ComplianceReport;
use aplus_infra::RequestId;
use axum::{
    extract::{Extension, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Check one product image against the main-image rules
///
/// Ingress rejections (missing field, wrong type, too large) answer with an
/// `ErrorResponse`. Every accepted upload answers with a report: PASS or FAIL
/// with 200, ERROR with 400 when the bytes do not decode and 500 otherwise.
#[utoipa::path(
    post,
    path = "/webhook/image-compliance",
    tag = "compliance",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis finished (PASS or FAIL)", body = ComplianceReport),
        (status = 400, description = "Invalid upload, or ERROR report for an undecodable image", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "ERROR report for an internal failure", body = ComplianceReport)
    )
)]
#[tracing::instrument(
    skip(state, request_id, multipart),
    fields(
        request_id = %request_id.0,
        filename = tracing::field::Empty,
        mimetype = tracing::field::Empty,
        size = tracing::field::Empty,
        operation = "image_compliance"
    )
)]
pub async fn check_image_compliance(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    multipart: Multipart,
) -> Response {
    match analyze_upload(&state, multipart).await {
        Ok(response) => response,
        Err(err) => err.render(!state.config.is_production()),
    }
}

async fn analyze_upload(state: &AppState, multipart: Multipart) -> Result<Response, HttpAppError> {
    let upload = extract_multipart_file(multipart).await?;

    let span = tracing::Span::current();
    span.record("filename", upload.filename.as_str());
    span.record("mimetype", upload.content_type.as_str());
    span.record("size", upload.size());

    state
        .validator
        .validate_all(&upload.content_type, upload.size())?;

    let response = match state.analyzer.analyze(&upload).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => {
            let status = if err.is_decode() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(state.analyzer.error_report(&err))).into_response()
        }
    };

    Ok(response)
}
