//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`mirror`]: Triggering a site download
//! - [`system`]: Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod mirror;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use mirror::*;
pub use system::*;

/// Query parameters for GET /download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Site root to mirror, e.g. `http://example.com`
    pub url: Option<String>,
}
