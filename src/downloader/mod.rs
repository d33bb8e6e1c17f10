//! Download orchestration split into focused submodules.
//!
//! The `WaybackMirror` struct and its methods are organized by concern:
//! - [`fetch`] - Time-travel addressing and storing a single capture
//! - [`run`] - The per-run worklist: index entries, page scanning, asset batches

mod fetch;
mod run;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use fetch::time_travel_address;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{CdxIndex, SnapshotSource};
use crate::mirror;
use crate::types::{Event, RunSummary, SnapshotEntry};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Mirrors sites from the Wayback Machine (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct WaybackMirror {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// HTTP client for time-travel fetches
    pub(crate) client: reqwest::Client,
    /// Where the list of captures comes from
    pub(crate) index: Arc<dyn SnapshotSource>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl WaybackMirror {
    /// Create a mirror that resolves captures through the configured CDX endpoint
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(&config)?;
        let index = Arc::new(CdxIndex::new(
            client.clone(),
            &config.archive,
            config.retry.clone(),
        ));
        Self::build(config, client, index)
    }

    /// Create a mirror with a custom snapshot source
    pub fn with_snapshot_source(config: Config, index: Arc<dyn SnapshotSource>) -> Result<Self> {
        let client = build_client(&config)?;
        Self::build(config, client, index)
    }

    fn build(
        config: Config,
        client: reqwest::Client,
        index: Arc<dyn SnapshotSource>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            client,
            index,
            event_tx,
        })
    }

    /// Subscribe to progress events
    ///
    /// Each subscriber receives every event emitted after it subscribed.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Backup root a site is mirrored into: `<backups_dir>/<sanitized hostname>`
    pub fn backup_root_for(&self, site_url: &str) -> Result<PathBuf> {
        mirror::backup_root(&self.config.mirror.backups_dir, site_url)
    }

    /// Mirror `site_url` into its backup root under the configured backups directory
    pub async fn mirror_site(&self, site_url: &str) -> Result<RunSummary> {
        let backup_root = self.backup_root_for(site_url)?;
        self.run(site_url, &backup_root).await
    }

    /// Resolve every capture under `base_url` and mirror it into `backup_root`
    ///
    /// Index entries are processed one at a time, in index order. Each entry
    /// that turns out to be a page (stored as `index.html`) is scanned for
    /// stylesheets, scripts and images, which are stored next; assets are not
    /// scanned themselves.
    ///
    /// # Errors
    ///
    /// - The index cannot be resolved (always fatal)
    /// - An index entry fails while
    ///   [`EntryFailurePolicy::Abort`](crate::config::EntryFailurePolicy::Abort) is configured
    ///
    /// Asset failures never abort the run; they are logged and counted.
    pub async fn run(&self, base_url: &str, backup_root: &Path) -> Result<RunSummary> {
        self.emit(Event::RunStarted {
            base_url: base_url.to_string(),
            backup_root: backup_root.to_path_buf(),
        });
        tracing::info!(
            base_url = %base_url,
            backup_root = %backup_root.display(),
            "Starting mirror run"
        );

        let result = self.run_inner(base_url, backup_root).await;
        match &result {
            Ok(summary) => {
                tracing::info!(
                    base_url = %base_url,
                    pages = summary.pages,
                    assets = summary.assets,
                    failed_assets = summary.failed_assets,
                    failed_entries = summary.failed_entries,
                    bytes = summary.bytes_written,
                    "Mirror run complete"
                );
                self.emit(Event::RunComplete {
                    summary: summary.clone(),
                });
            }
            Err(e) => {
                tracing::error!(base_url = %base_url, error = %e, "Mirror run failed");
                self.emit(Event::RunFailed {
                    base_url: base_url.to_string(),
                    error: e.to_string(),
                });
            }
        }
        result
    }

    async fn run_inner(&self, base_url: &str, backup_root: &Path) -> Result<RunSummary> {
        let entries = self.index.resolve_snapshots(base_url).await?;
        self.emit(Event::IndexResolved {
            base_url: base_url.to_string(),
            entries: entries.len(),
        });

        let mut run = run::MirrorRun::new(self, base_url, backup_root);
        run.process_entries(entries).await?;
        Ok(run.finish())
    }

    /// Fetch and store one capture, then its assets if it is a page
    ///
    /// This is the single-entry form of [`run`](Self::run); the index is not consulted.
    pub async fn fetch_and_store(
        &self,
        entry: &SnapshotEntry,
        backup_root: &Path,
    ) -> Result<RunSummary> {
        let mut run = run::MirrorRun::new(self, &entry.original_url, backup_root);
        run.fetch_and_store(entry).await?;
        Ok(run.finish())
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}

fn build_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(config.archive.connect_timeout)
        .user_agent(config.archive.user_agent.clone())
        .build()
        .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
}
