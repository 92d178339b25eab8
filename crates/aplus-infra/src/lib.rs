//! A+ Infrastructure Library
//!
//! Shared infrastructure for the A+ compliance service:
//! - Middleware (request ID, security headers)
//! - Tracing subscriber initialization

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    request_id_middleware, security_headers_middleware, RequestId, SecurityHeaders,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, LogFormat};
