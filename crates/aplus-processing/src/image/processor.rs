//! Image processor - decoding, metadata extraction and sampling

use aplus_core::{AnalysisError, ColorSpace, ImageMetadata};
use image::imageops::FilterType;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageDecoder, ImageReader, RgbaImage,
};
use std::io::Cursor;

/// A fully decoded upload with its metadata.
pub struct DecodedImage {
    pub metadata: ImageMetadata,
    pub image: DynamicImage,
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode image bytes and extract width, height and color space.
    ///
    /// Runs to completion or fails; there are no partial results.
    pub fn decode(data: &[u8]) -> Result<DecodedImage, AnalysisError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;
        let detected_format = reader.format().map(|f| format!("{:?}", f));

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        // A broken ICC chunk should not fail an otherwise decodable image
        let icc_profile = decoder.icc_profile().ok().flatten();
        let color_space = icc_profile
            .as_deref()
            .and_then(Self::color_space_from_icc)
            .unwrap_or_else(|| Self::color_space_from_color_type(decoder.original_color_type()));

        let image = DynamicImage::from_decoder(decoder)
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;
        let (width, height) = image.dimensions();

        Ok(DecodedImage {
            metadata: ImageMetadata {
                width,
                height,
                color_space,
                detected_format,
            },
            image,
        })
    }

    /// Extract metadata only
    pub fn extract_metadata(data: &[u8]) -> Result<ImageMetadata, AnalysisError> {
        Self::decode(data).map(|decoded| decoded.metadata)
    }

    /// Downscale into a `size`x`size` bounding box, keeping the aspect ratio,
    /// with an explicit alpha channel.
    pub fn sample(image: &DynamicImage, size: u32) -> RgbaImage {
        image.resize(size, size, FilterType::Lanczos3).to_rgba8()
    }

    fn color_space_from_color_type(color_type: ExtendedColorType) -> ColorSpace {
        match color_type {
            ExtendedColorType::L1
            | ExtendedColorType::L2
            | ExtendedColorType::L4
            | ExtendedColorType::L8
            | ExtendedColorType::L16
            | ExtendedColorType::La1
            | ExtendedColorType::La2
            | ExtendedColorType::La4
            | ExtendedColorType::La8
            | ExtendedColorType::La16 => ColorSpace::Grayscale,
            ExtendedColorType::Cmyk8 => ColorSpace::Cmyk,
            ExtendedColorType::Rgb1
            | ExtendedColorType::Rgb2
            | ExtendedColorType::Rgb4
            | ExtendedColorType::Rgb8
            | ExtendedColorType::Rgb16
            | ExtendedColorType::Rgb32F
            | ExtendedColorType::Rgba1
            | ExtendedColorType::Rgba2
            | ExtendedColorType::Rgba4
            | ExtendedColorType::Rgba8
            | ExtendedColorType::Rgba16
            | ExtendedColorType::Rgba32F => ColorSpace::Srgb,
            _ => ColorSpace::Unknown,
        }
    }

    /// Data colour space signature from the ICC header (bytes 16..20)
    fn color_space_from_icc(profile: &[u8]) -> Option<ColorSpace> {
        match profile.get(16..20)? {
            b"RGB " => Some(ColorSpace::Srgb),
            b"CMYK" => Some(ColorSpace::Cmyk),
            b"GRAY" => Some(ColorSpace::Grayscale),
            _ => None,
        }
    }
}
