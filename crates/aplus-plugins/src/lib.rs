//! Vision annotator implementations

#[cfg(feature = "plugin-google-vision")]
mod google_vision;

#[cfg(feature = "plugin-google-vision")]
pub use google_vision::GoogleVisionClient;
