//! Core types for wayback-mirror

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Timestamp layout used by the CDX index (`YYYYMMDDhhmmss`)
const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// One archived capture to fetch: a capture time token plus the original URL
///
/// Together the two fields address one byte stream at the time-travel endpoint.
/// The timestamp is treated as opaque for addressing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SnapshotEntry {
    /// Capture time token as returned by the index
    pub timestamp: String,
    /// URL of the resource as it was originally served
    pub original_url: String,
}

impl SnapshotEntry {
    /// Create a new entry
    pub fn new(timestamp: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            original_url: original_url.into(),
        }
    }

    /// Entry for an asset discovered on this entry's page, reusing its capture time
    pub fn for_asset(&self, asset_url: impl Into<String>) -> Self {
        Self::new(self.timestamp.clone(), asset_url)
    }

    /// Capture time, when the token is a well-formed 14-digit timestamp
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.timestamp, CAPTURE_TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl std::fmt::Display for SnapshotEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.original_url, self.timestamp)
    }
}

/// Whether a resource came from the index or from a page's markup
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Top-level entry returned by the snapshot index
    Page,
    /// Stylesheet, script or image referenced from a page
    Asset,
}

/// Result of persisting one capture
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredResource {
    /// Time-travel address the bytes were fetched from
    pub address: String,
    /// Local file the bytes were written to
    #[schema(value_type = String)]
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
}

/// Outcome of a complete mirroring run
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    /// Site root the index was queried for
    pub base_url: String,
    /// Directory the mirror was written under
    #[schema(value_type = String)]
    pub backup_root: PathBuf,
    /// Index entries stored
    pub pages: usize,
    /// Discovered assets stored
    pub assets: usize,
    /// Assets that could not be resolved, fetched or stored
    pub failed_assets: usize,
    /// Index entries that failed (only non-zero when continuing past failures)
    pub failed_entries: usize,
    /// Resources not fetched again because their URL was already mirrored this run
    pub skipped: usize,
    /// Total bytes written to disk
    pub bytes_written: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub(crate) fn start(base_url: &str, backup_root: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            base_url: base_url.to_string(),
            backup_root,
            pages: 0,
            assets: 0,
            failed_assets: 0,
            failed_entries: 0,
            skipped: 0,
            bytes_written: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn record_stored(&mut self, kind: ResourceKind, stored: &StoredResource) {
        match kind {
            ResourceKind::Page => self.pages += 1,
            ResourceKind::Asset => self.assets += 1,
        }
        self.bytes_written += stored.bytes;
    }
}

/// Progress events emitted during a run
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run began
    RunStarted {
        /// Site root being mirrored
        base_url: String,
        /// Destination directory
        backup_root: PathBuf,
    },

    /// The snapshot index was resolved
    IndexResolved {
        /// Site root being mirrored
        base_url: String,
        /// Number of entries to fetch
        entries: usize,
    },

    /// A capture was written to disk
    ResourceStored {
        /// Original URL of the capture
        url: String,
        /// Page or asset
        kind: ResourceKind,
        /// Local file written
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// An asset failed and was skipped
    AssetFailed {
        /// Reference or URL of the asset
        url: String,
        /// Error description
        error: String,
    },

    /// A top-level entry failed and the run continued
    EntryFailed {
        /// Original URL of the entry
        url: String,
        /// Error description
        error: String,
    },

    /// The run finished
    RunComplete {
        /// Final counters
        summary: RunSummary,
    },

    /// The run aborted
    RunFailed {
        /// Site root being mirrored
        base_url: String,
        /// Error description
        error: String,
    },
}

impl Event {
    /// Short event name, used as the SSE event type
    pub fn name(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run_started",
            Event::IndexResolved { .. } => "index_resolved",
            Event::ResourceStored { .. } => "resource_stored",
            Event::AssetFailed { .. } => "asset_failed",
            Event::EntryFailed { .. } => "entry_failed",
            Event::RunComplete { .. } => "run_complete",
            Event::RunFailed { .. } => "run_failed",
        }
    }
}
