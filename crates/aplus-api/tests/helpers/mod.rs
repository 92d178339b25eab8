//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p aplus-api`.

#![allow(dead_code)]

pub mod fixtures;

use aplus_api::setup::routes;
use aplus_api::AppState;
use aplus_core::{
    AnalyzerConfig, BaseConfig, Config, RemoteServiceError, ServiceConfig, VisionAnnotations,
    VisionAnnotator,
};
use aplus_processing::ComplianceAnalyzer;
use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::Arc;

pub const COMPLIANCE_PATH: &str = "/webhook/image-compliance";

/// Upload ceiling used by the test server
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

pub fn test_config() -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            http_concurrency_limit: 64,
            log_format: "pretty".to_string(),
        },
        max_upload_size_bytes: TEST_MAX_UPLOAD_BYTES,
        vision: None,
        analyzer: AnalyzerConfig::default(),
    }))
}

/// Annotator returning a fixed answer
#[derive(Debug)]
pub struct StubAnnotator(pub Result<VisionAnnotations, RemoteServiceError>);

#[async_trait]
impl VisionAnnotator for StubAnnotator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn annotate(&self, _image: &[u8]) -> Result<VisionAnnotations, RemoteServiceError> {
        self.0.clone()
    }
}

fn server_for(config: Config, analyzer: ComplianceAnalyzer) -> TestServer {
    let state = Arc::new(AppState::new(config.clone(), analyzer));
    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

/// Test server without content rules
pub fn setup_test_app() -> TestServer {
    setup_test_app_with_config(test_config())
}

/// Test server without content rules, built from `config`
pub fn setup_test_app_with_config(config: Config) -> TestServer {
    let analyzer = ComplianceAnalyzer::new(config.analyzer().clone())
        .with_error_details(!config.is_production());
    server_for(config, analyzer)
}

/// `test_config` deployed as production
pub fn production_config() -> Config {
    let mut config = test_config();
    config.0.base.environment = "production".to_string();
    config.0.base.cors_origins = vec!["https://seller.example.com".to_string()];
    config
}

/// Test server whose content rules see `annotator`'s answer
pub fn setup_test_app_with_annotator(annotator: StubAnnotator) -> TestServer {
    let config = test_config();
    let analyzer = ComplianceAnalyzer::new(config.analyzer().clone())
        .with_error_details(true)
        .with_annotator(Arc::new(annotator));
    server_for(config, analyzer)
}
