//! Image module
//!
//! Decoding, metadata extraction and the downscaled pixel sample used by the
//! background analyzer.

pub mod processor;

pub use processor::{DecodedImage, ImageProcessor};
