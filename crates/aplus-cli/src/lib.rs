//! Helpers for the `aplus` command line tool.

use anyhow::Context;
use aplus_core::{Compliance, ComplianceReport, UploadedImage};
use std::path::Path;

/// MIME type for a file extension, limited to the formats the service accepts
/// plus a few it rejects with a clear message.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}

/// Read a local file as an upload. An explicit `mime` wins over the extension.
pub fn load_upload(path: &Path, mime: Option<&str>) -> anyhow::Result<UploadedImage> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let content_type = mime
        .or_else(|| mime_from_extension(path))
        .unwrap_or("application/octet-stream");
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(UploadedImage::new(data, content_type, filename))
}

/// Process exit status for a rejected upload
pub const EXIT_REJECTED: u8 = 3;

/// 0 for PASS, 1 for FAIL, 2 for ERROR
pub fn exit_code(report: &ComplianceReport) -> u8 {
    match report.compliance {
        Compliance::Pass => 0,
        Compliance::Fail => 1,
        Compliance::Error => 2,
    }
}

/// Initialize tracing for the CLI. Diagnostics go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
