//! A+ Compliance API Library
//!
//! HTTP handlers, error rendering and application setup for the image
//! compliance webhook.

mod api_doc;
mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
