//! Application setup and initialization
//!
//! Kept out of main.rs so tests can build the same router without binding a
//! socket or installing a global subscriber.

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use aplus_core::Config;
use aplus_infra::LogFormat;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration, before anything is initialized
    validation::validate_config(&config).context("Configuration validation failed")?;

    aplus_infra::init_telemetry(LogFormat::parse(config.log_format()), None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config)?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
