//! The per-run worklist.
//!
//! Index entries are consumed one at a time. A page's assets form a batch that
//! is fetched through a bounded stream (`max_concurrent_assets`, 1 by default),
//! so results are handled in discovery order either way.

use crate::assets::{extract_assets, page_origin};
use crate::config::EntryFailurePolicy;
use crate::error::Result;
use crate::mirror::{MirrorWriter, is_directory_index};
use crate::types::{Event, ResourceKind, RunSummary, SnapshotEntry};
use futures::StreamExt;
use std::collections::{HashSet, VecDeque};
use std::path::Path;

use super::WaybackMirror;

pub(super) struct MirrorRun<'a> {
    mirror: &'a WaybackMirror,
    writer: MirrorWriter,
    summary: RunSummary,
    /// Original URLs already attempted; only consulted when `skip_fetched` is on
    fetched: HashSet<String>,
}

impl<'a> MirrorRun<'a> {
    pub(super) fn new(mirror: &'a WaybackMirror, base_url: &str, backup_root: &Path) -> Self {
        Self {
            mirror,
            writer: MirrorWriter::new(backup_root),
            summary: RunSummary::start(base_url, backup_root.to_path_buf()),
            fetched: HashSet::new(),
        }
    }

    pub(super) async fn process_entries(&mut self, entries: Vec<SnapshotEntry>) -> Result<()> {
        let mut worklist: VecDeque<SnapshotEntry> = entries.into();

        while let Some(entry) = worklist.pop_front() {
            let Err(e) = self.fetch_and_store(&entry).await else {
                continue;
            };

            match self.mirror.config.mirror.on_entry_failure {
                EntryFailurePolicy::Abort => return Err(e),
                EntryFailurePolicy::Continue => {
                    tracing::warn!(
                        url = %entry.original_url,
                        timestamp = %entry.timestamp,
                        error = %e,
                        "Failed to mirror entry, continuing"
                    );
                    self.summary.failed_entries += 1;
                    self.mirror.emit(Event::EntryFailed {
                        url: entry.original_url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Store one index entry and, when it is a page, its assets
    pub(super) async fn fetch_and_store(&mut self, entry: &SnapshotEntry) -> Result<()> {
        if !self.claim(&entry.original_url) {
            tracing::debug!(url = %entry.original_url, "Already mirrored this run, skipping");
            self.summary.skipped += 1;
            return Ok(());
        }

        let stored = self
            .mirror
            .store_capture(entry, ResourceKind::Page, &self.writer)
            .await?;
        self.summary.record_stored(ResourceKind::Page, &stored);

        if !is_directory_index(&stored.path) {
            return Ok(());
        }

        let html = self.writer.read_text(&stored.path).await?;
        let Some(origin) = page_origin(&entry.original_url) else {
            tracing::warn!(url = %entry.original_url, "Page has no origin, not scanning for assets");
            return Ok(());
        };

        let discovered = extract_assets(&html, &origin);
        for skipped in &discovered.skipped {
            record_asset_failure(
                self.mirror,
                &mut self.summary,
                &skipped.reference,
                &skipped.reason,
            );
        }

        let mut batch = Vec::with_capacity(discovered.urls.len());
        for url in discovered.urls {
            if self.claim(url.as_str()) {
                batch.push(entry.for_asset(url.as_str()));
            } else {
                self.summary.skipped += 1;
            }
        }
        self.store_assets(batch).await;

        Ok(())
    }

    async fn store_assets(&mut self, batch: Vec<SnapshotEntry>) {
        if batch.is_empty() {
            return;
        }

        let mirror = self.mirror;
        let writer = &self.writer;
        let limit = mirror.config.mirror.max_concurrent_assets.max(1);

        let mut results = futures::stream::iter(batch)
            .map(|asset| async move {
                let result = mirror
                    .store_capture(&asset, ResourceKind::Asset, writer)
                    .await;
                (asset, result)
            })
            .buffered(limit);

        while let Some((asset, result)) = results.next().await {
            match result {
                Ok(stored) => self.summary.record_stored(ResourceKind::Asset, &stored),
                Err(e) => record_asset_failure(
                    mirror,
                    &mut self.summary,
                    &asset.original_url,
                    &e.to_string(),
                ),
            }
        }
    }

    /// Whether `url` should be fetched; marks it as fetched in at-most-once mode
    fn claim(&mut self, url: &str) -> bool {
        !self.mirror.config.mirror.skip_fetched || self.fetched.insert(url.to_string())
    }

    pub(super) fn finish(mut self) -> RunSummary {
        self.summary.finished_at = chrono::Utc::now();
        self.summary
    }
}

fn record_asset_failure(
    mirror: &WaybackMirror,
    summary: &mut RunSummary,
    reference: &str,
    error: &str,
) {
    tracing::warn!(asset = %reference, error = %error, "Failed to download asset");
    summary.failed_assets += 1;
    mirror.emit(Event::AssetFailed {
        url: reference.to_string(),
        error: error.to_string(),
    });
}
