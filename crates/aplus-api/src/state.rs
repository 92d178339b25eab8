//! Application state shared by every request.

use aplus_core::Config;
use aplus_processing::{ComplianceAnalyzer, IngressValidator};

/// Immutable after startup. Requests only read from it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub analyzer: ComplianceAnalyzer,
    pub validator: IngressValidator,
}

impl AppState {
    pub fn new(config: Config, analyzer: ComplianceAnalyzer) -> Self {
        let validator = IngressValidator::new(config.max_upload_size_bytes());
        Self {
            config,
            analyzer,
            validator,
        }
    }
}
