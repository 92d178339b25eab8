//! Analyzer construction

use crate::state::AppState;
use anyhow::Result;
use aplus_core::{Config, VisionConfig};
use aplus_processing::ComplianceAnalyzer;
use std::sync::Arc;

/// Build the shared analyzer and application state.
///
/// The content rule engine is enabled only when a vision credential is configured.
pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let analyzer = ComplianceAnalyzer::new(config.analyzer().clone())
        .with_error_details(!config.is_production());

    let analyzer = match config.vision() {
        Some(vision) => attach_vision(analyzer, vision)?,
        None => {
            tracing::info!("No vision credential configured, content rules disabled");
            analyzer
        }
    };

    tracing::info!(
        content_rules = analyzer.has_annotator(),
        expose_error_details = !config.is_production(),
        "Compliance analyzer ready"
    );

    Ok(Arc::new(AppState::new(config.clone(), analyzer)))
}

#[cfg(feature = "plugin-google-vision")]
fn attach_vision(
    analyzer: ComplianceAnalyzer,
    vision: &VisionConfig,
) -> Result<ComplianceAnalyzer> {
    let client = aplus_plugins::GoogleVisionClient::new(vision)?;
    tracing::info!(
        endpoint = %vision.endpoint,
        timeout_secs = vision.timeout.as_secs(),
        "Google Vision content rules enabled"
    );
    Ok(analyzer.with_annotator(Arc::new(client)))
}

#[cfg(not(feature = "plugin-google-vision"))]
fn attach_vision(
    analyzer: ComplianceAnalyzer,
    _vision: &VisionConfig,
) -> Result<ComplianceAnalyzer> {
    tracing::warn!(
        "Vision credential set but plugin-google-vision is not compiled in, content rules disabled"
    );
    Ok(analyzer)
}
