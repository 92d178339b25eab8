//! Test fixtures: synthetic product images.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode fixture");
    buffer
}

/// 1600x1600 white JPEG with a centered gray product block. Passes every
/// technical and background rule.
pub fn compliant_product_jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(1600, 1600, |x, y| {
        if (240..1376).contains(&x) && (240..1376).contains(&y) {
            Rgb([120, 120, 120])
        } else {
            Rgb([255, 255, 255])
        }
    });
    encode(img, ImageFormat::Jpeg)
}

/// Small all-white PNG: wrong format, too small, no product.
pub fn small_white_png() -> Vec<u8> {
    encode(
        RgbImage::from_pixel(200, 200, Rgb([255, 255, 255])),
        ImageFormat::Png,
    )
}
