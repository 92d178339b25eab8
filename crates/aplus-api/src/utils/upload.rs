//! Multipart upload extraction

use aplus_core::UploadedImage;
use aplus_processing::IngressError;
use axum::extract::Multipart;

use crate::error::HttpAppError;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Extract the single `file` field from a multipart form.
///
/// Other fields are ignored. A second `file` field is rejected.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
) -> Result<UploadedImage, HttpAppError> {
    let mut upload: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(IngressError::MultipleFiles.into());
        }

        let filename = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        upload = Some(UploadedImage::new(data, content_type, filename));
    }

    upload.ok_or_else(|| IngressError::MissingFile.into())
}
