use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::ToSchema;

/// Color space of the decoded source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Srgb,
    Cmyk,
    Grayscale,
    Unknown,
}

impl ColorSpace {
    pub fn is_known(&self) -> bool {
        !matches!(self, ColorSpace::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSpace::Srgb => "srgb",
            ColorSpace::Cmyk => "cmyk",
            ColorSpace::Grayscale => "grayscale",
            ColorSpace::Unknown => "unknown",
        }
    }
}

/// Image metadata, extracted once per upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// Container format detected from the bytes (e.g. "Jpeg"), not the declared one
    pub detected_format: Option<String>,
}

impl ImageMetadata {
    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

/// One uploaded file, owned by a single analysis.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    pub content_type: String,
    pub filename: String,
}

impl UploadedImage {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Format declared by the uploader: the filename extension, or a mapping
    /// of the MIME type when the filename has none. Empty when neither helps.
    pub fn declared_format(&self) -> String {
        let from_extension = Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .filter(|e| !e.is_empty());

        if let Some(ext) = from_extension {
            return ext;
        }

        let mime = self.content_type.to_lowercase();
        let mapped = if mime.contains("jpeg") {
            "jpg"
        } else if mime.contains("png") {
            "png"
        } else if mime.contains("gif") {
            "gif"
        } else if mime.contains("tiff") {
            "tiff"
        } else {
            ""
        };
        mapped.to_string()
    }
}
