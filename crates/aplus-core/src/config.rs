//! Configuration module
//!
//! Service configuration comes from the environment (and an optional `.env`
//! file). The analyzer thresholds live in [`AnalyzerConfig`], an immutable
//! struct handed to the analyzer at construction.

use std::env;
use std::time::Duration;

// Common constants
const DEFAULT_PORT: u16 = 5678;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const VISION_TIMEOUT_SECS: u64 = 5;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const DEFAULT_VISION_API_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Side length of the square bounding box the image is downscaled into
pub const SAMPLE_SIZE: u32 = 100;
/// Fraction of width/height from each border that counts as "edge"
pub const EDGE_THRESHOLD_FRACTION: f64 = 0.1;
/// Max per-channel distance from 255 for a pixel to count as white
pub const WHITE_TOLERANCE: u8 = 15;
pub const MIN_EDGE_WHITE_RATIO: f64 = 0.85;
pub const MIN_EDGE_BRIGHTNESS: f64 = 240.0;
pub const MAX_CENTER_WHITE_RATIO: f64 = 0.7;
/// Below this edge whiteness a passing background still earns a quality warning
pub const CLEAN_EDGE_WHITE_RATIO: f64 = 0.95;
pub const MIN_COVERAGE: f64 = 0.75;
pub const TARGET_COVERAGE: f64 = 0.85;
pub const COVERAGE_TOLERANCE: f64 = 0.10;
pub const MIN_LONGEST_SIDE: u32 = 1600;
pub const MAX_LONGEST_SIDE: u32 = 10000;
pub const SQUARE_RATIO_MIN: f64 = 0.9;
pub const SQUARE_RATIO_MAX: f64 = 1.1;

/// Thresholds used by the technical rules and the background/coverage analyzer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerConfig {
    pub sample_size: u32,
    pub edge_threshold_fraction: f64,
    pub white_tolerance: u8,
    pub min_edge_white_ratio: f64,
    pub min_edge_brightness: f64,
    pub max_center_white_ratio: f64,
    pub clean_edge_white_ratio: f64,
    pub min_coverage: f64,
    pub target_coverage: f64,
    pub coverage_tolerance: f64,
    /// Inclusive (min, max) bounds for the longest image side in pixels
    pub size_bounds: (u32, u32),
    pub square_ratio: (f64, f64),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_size: SAMPLE_SIZE,
            edge_threshold_fraction: EDGE_THRESHOLD_FRACTION,
            white_tolerance: WHITE_TOLERANCE,
            min_edge_white_ratio: MIN_EDGE_WHITE_RATIO,
            min_edge_brightness: MIN_EDGE_BRIGHTNESS,
            max_center_white_ratio: MAX_CENTER_WHITE_RATIO,
            clean_edge_white_ratio: CLEAN_EDGE_WHITE_RATIO,
            min_coverage: MIN_COVERAGE,
            target_coverage: TARGET_COVERAGE,
            coverage_tolerance: COVERAGE_TOLERANCE,
            size_bounds: (MIN_LONGEST_SIDE, MAX_LONGEST_SIDE),
            square_ratio: (SQUARE_RATIO_MIN, SQUARE_RATIO_MAX),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.sample_size == 0 {
            return Err(anyhow::anyhow!("Sample size cannot be 0"));
        }
        if !(self.edge_threshold_fraction > 0.0 && self.edge_threshold_fraction < 0.5) {
            return Err(anyhow::anyhow!(
                "Edge threshold fraction must be in (0, 0.5), got {}",
                self.edge_threshold_fraction
            ));
        }
        for (name, value) in [
            ("min_edge_white_ratio", self.min_edge_white_ratio),
            ("max_center_white_ratio", self.max_center_white_ratio),
            ("clean_edge_white_ratio", self.clean_edge_white_ratio),
            ("min_coverage", self.min_coverage),
            ("target_coverage", self.target_coverage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow::anyhow!("{} must be in [0, 1], got {}", name, value));
            }
        }
        if self.min_coverage > self.target_coverage {
            return Err(anyhow::anyhow!(
                "min_coverage ({}) cannot exceed target_coverage ({})",
                self.min_coverage,
                self.target_coverage
            ));
        }
        if self.size_bounds.0 > self.size_bounds.1 {
            return Err(anyhow::anyhow!(
                "Size bounds are inverted: {:?}",
                self.size_bounds
            ));
        }
        if self.square_ratio.0 > self.square_ratio.1 {
            return Err(anyhow::anyhow!(
                "Square ratio bounds are inverted: {:?}",
                self.square_ratio
            ));
        }
        Ok(())
    }
}

/// Base configuration shared by the server and the CLI
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    pub log_format: String,
}

/// Remote vision annotation settings. Absent when no credential is configured.
#[derive(Clone)]
pub struct VisionConfig {
    /// WARNING: credential. Never log this field.
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Compliance service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub max_upload_size_bytes: usize,
    pub vision: Option<VisionConfig>,
    pub analyzer: AnalyzerConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_service().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_service().base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.as_service().base.log_format
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_service().max_upload_size_bytes
    }

    pub fn vision(&self) -> Option<&VisionConfig> {
        self.as_service().vision.as_ref()
    }

    pub fn analyzer(&self) -> &AnalyzerConfig {
        &self.as_service().analyzer
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn upload_mb_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", mb))
}

/// First set, non-empty variable among `names`.
fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment =
            env_any(&["ENVIRONMENT", "APP_ENV"]).unwrap_or_else(|| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_mb = env_any(&["MAX_UPLOAD_SIZE_MB", "MAX_UPLOAD_MB"])
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a whole number"))
            })
            .transpose()?
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = upload_mb_to_bytes(max_upload_mb)?;

        let vision = env_any(&["VISION_CREDENTIAL", "GOOGLE_VISION_API_KEY"]).map(|api_key| {
            VisionConfig {
                api_key,
                endpoint: env::var("VISION_API_URL")
                    .unwrap_or_else(|_| DEFAULT_VISION_API_URL.to_string()),
                timeout: Duration::from_secs(
                    env::var("VISION_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(VISION_TIMEOUT_SECS),
                ),
            }
        });

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase(),
        };

        Ok(Self {
            base,
            max_upload_size_bytes,
            vision,
            analyzer: AnalyzerConfig::default(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }
        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT cannot be 0"));
        }
        if let Some(vision) = &self.vision {
            if vision.timeout.is_zero() {
                return Err(anyhow::anyhow!("VISION_TIMEOUT_SECS cannot be 0"));
            }
            if !vision.endpoint.starts_with("http://") && !vision.endpoint.starts_with("https://")
            {
                return Err(anyhow::anyhow!(
                    "VISION_API_URL must be an http(s) URL, got '{}'",
                    vision.endpoint
                ));
            }
        }
        self.analyzer.validate()
    }
}
