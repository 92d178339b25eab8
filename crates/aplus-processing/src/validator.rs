/// Content types accepted at ingress, after normalization
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/tiff",
    "image/tif",
];

/// Upload rejections raised before any analysis runs
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    #[error("No file uploaded (field name must be 'file')")]
    MissingFile,

    #[error("Only one file may be uploaded per request")]
    MultipleFiles,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },
}

/// Strip parameters (`; charset=...`) and lowercase a MIME type.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Upload validator
///
/// Checks the declared content type and the byte size of one upload.
#[derive(Debug, Clone)]
pub struct IngressValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl IngressValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self {
            max_file_size,
            allowed_content_types: ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size. Zero bytes pass here and fail at decode.
    pub fn validate_file_size(&self, size: usize) -> Result<(), IngressError> {
        if size > self.max_file_size {
            return Err(IngressError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), IngressError> {
        let normalized = normalize_content_type(content_type);

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(IngressError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Content type first, so a wrong type wins over an oversized body
    pub fn validate_all(&self, content_type: &str, file_size: usize) -> Result<(), IngressError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(file_size)?;
        Ok(())
    }
}
