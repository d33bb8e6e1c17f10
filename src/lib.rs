//! # wayback-mirror
//!
//! Rebuild a browsable local copy of a website from its Wayback Machine captures.
//!
//! A run asks the CDX index for every capture under a site root, fetches each
//! capture's original bytes through the archive's time-travel endpoint, writes
//! them to a path derived from the original URL, and for every page also
//! fetches the stylesheets, scripts and images it references.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wayback_mirror::{Config, WaybackMirror};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mirror = WaybackMirror::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = mirror.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = mirror.mirror_site("http://example.com").await?;
//!     println!("{} pages, {} assets", summary.pages, summary.assets);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Asset discovery in archived pages
pub mod assets;
/// Configuration types
pub mod config;
/// Run orchestration (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Snapshot index resolution
pub mod index;
/// Local mirror layout and persistence
pub mod mirror;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, EntryFailurePolicy};
pub use downloader::WaybackMirror;
pub use error::{ApiError, Error, ErrorDetail, FetchError, IndexError, Result, ToHttpStatus};
pub use index::{CdxIndex, SnapshotSource};
pub use types::{Event, ResourceKind, RunSummary, SnapshotEntry, StoredResource};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Serve the trigger API until a termination signal arrives.
///
/// On SIGTERM/SIGINT (Ctrl+C elsewhere) the server stops accepting connections
/// and waits for in-flight downloads to finish before returning.
///
/// # Example
///
/// ```no_run
/// use wayback_mirror::{Config, WaybackMirror, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mirror = WaybackMirror::new(Config::default())?;
///     run_with_shutdown(mirror).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(mirror: WaybackMirror) -> Result<()> {
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutting down, waiting for in-flight downloads");
        signal_token.cancel();
    });

    let config = Arc::new(mirror.config().clone());
    api::start_api_server(Arc::new(mirror), config, shutdown).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
