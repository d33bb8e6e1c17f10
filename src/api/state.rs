//! Application state for the API server

use crate::{Config, WaybackMirror};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The mirror that runs triggered downloads
    pub mirror: Arc<WaybackMirror>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(mirror: Arc<WaybackMirror>, config: Arc<Config>) -> Self {
        Self { mirror, config }
    }
}
