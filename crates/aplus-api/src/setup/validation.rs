//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use aplus_core::Config;

/// Validate critical configuration values
///
/// Fails on values that would make the service insecure or unable to serve.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.vision().is_none() {
        tracing::warn!("VISION_CREDENTIAL not set - text, logo and object checks will be skipped");
    }

    Ok(())
}
