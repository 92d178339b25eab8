//! Error types module
//!
//! `AppError` is the HTTP-facing error used at the ingress boundary. Errors raised
//! inside the analysis pipeline are `AnalysisError` (fatal for the report, turned
//! into a `compliance: "ERROR"` body) and `RemoteServiceError` (never fatal,
//! downgraded to a warning by the content rule engine).

use std::time::Duration;

/// Level an error is logged at when it is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes: bad uploads, wrong types
    Debug,
    Warn,
    /// Failures on our side
    Error,
}

/// How an error presents itself over HTTP
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable machine-readable code, e.g. `INVALID_FILE_TYPE`
    fn error_code(&self) -> &'static str;

    /// Retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show the caller
    fn client_message(&self) -> String;

    /// Internal details must never reach the caller
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Fixed presentation of one `AppError` variant
struct ErrorProfile {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const INVALID_INPUT: ErrorProfile = ErrorProfile {
    status: 400,
    code: "INVALID_INPUT",
    recoverable: false,
    action: Some("Send exactly one image in a multipart field named 'file'"),
    sensitive: false,
    level: LogLevel::Debug,
};

const INVALID_FILE_TYPE: ErrorProfile = ErrorProfile {
    status: 400,
    code: "INVALID_FILE_TYPE",
    recoverable: false,
    action: Some("Use JPEG, PNG, GIF, or TIFF"),
    sensitive: false,
    level: LogLevel::Debug,
};

const PAYLOAD_TOO_LARGE: ErrorProfile = ErrorProfile {
    status: 413,
    code: "PAYLOAD_TOO_LARGE",
    recoverable: false,
    action: Some("Reduce file size and try again"),
    sensitive: false,
    level: LogLevel::Debug,
};

const INTERNAL: ErrorProfile = ErrorProfile {
    status: 500,
    code: "INTERNAL_ERROR",
    recoverable: true,
    action: Some("Retry after a short delay"),
    sensitive: true,
    level: LogLevel::Error,
};

impl AppError {
    fn profile(&self) -> &'static ErrorProfile {
        match self {
            AppError::InvalidInput(_) => &INVALID_INPUT,
            AppError::UnsupportedMediaType(_) => &INVALID_FILE_TYPE,
            AppError::PayloadTooLarge(_) => &PAYLOAD_TOO_LARGE,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => &INTERNAL,
        }
    }

    /// Variant name, shown in non-production error bodies
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Display text followed by up to five `Caused by:` lines from the source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;
        const MAX_DEPTH: usize = 5;

        let mut lines = vec![self.to_string()];
        let mut source = self.source();
        while let Some(err) = source {
            if lines.len() > MAX_DEPTH {
                lines.push("  ... (truncated)".to_string());
                break;
            }
            lines.push(format!("  Caused by: {}", err));
            source = err.source();
        }
        lines.join("\n")
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.profile().status
    }

    fn error_code(&self) -> &'static str {
        self.profile().code
    }

    fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.profile().action
    }

    fn is_sensitive(&self) -> bool {
        self.profile().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.profile().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::UnsupportedMediaType(_) => {
                "Invalid file type. Use JPEG, PNG, GIF, TIFF.".to_string()
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Failure inside the analysis pipeline (decode through report assembly).
///
/// Both variants end the analysis; the caller renders them as the
/// `compliance: "ERROR"` report rather than a bare HTTP error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    /// Bytes are not a supported raster format or are truncated
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Internal analysis error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn is_decode(&self) -> bool {
        matches!(self, AnalysisError::Decode(_))
    }
}

/// Failure of the remote annotation call. Never escalates past the content rule engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteServiceError {
    #[error("Request to annotation service failed: {0}")]
    Transport(String),

    #[error("Annotation service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Annotation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Annotation service error {code:?}: {message}")]
    Api { code: Option<i32>, message: String },

    #[error("Malformed annotation response: {0}")]
    Malformed(String),
}
