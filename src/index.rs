//! Snapshot index resolution through the Wayback CDX API
//!
//! One query per run lists every capture under `<base_url>/*` that was served
//! with HTTP 200. The JSON output is a table whose first row names the columns;
//! that row is dropped and every following row becomes a [`SnapshotEntry`], in
//! the order the index returned them.

use crate::config::{ArchiveConfig, RetryConfig};
use crate::error::{Error, IndexError, Result};
use crate::retry::fetch_with_retry;
use crate::types::SnapshotEntry;
use async_trait::async_trait;
use std::time::Duration;

/// Source of the captures to mirror for a site
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// List the captures under `base_url`, in fetch order
    ///
    /// Any failure here is fatal for the run: there is no partial index to work from.
    async fn resolve_snapshots(&self, base_url: &str) -> Result<Vec<SnapshotEntry>>;
}

/// CDX server client
#[derive(Clone, Debug)]
pub struct CdxIndex {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl CdxIndex {
    /// Create a client for the configured CDX endpoint
    pub fn new(client: reqwest::Client, archive: &ArchiveConfig, retry: RetryConfig) -> Self {
        Self {
            client,
            endpoint: archive.index_url.clone(),
            timeout: archive.request_timeout,
            retry,
        }
    }

    /// The `url` parameter sent to the index for a site root
    pub fn query_pattern(base_url: &str) -> String {
        format!("{}/*", base_url.trim_end_matches('/'))
    }

    async fn query_once(&self, base_url: &str) -> Result<Vec<SnapshotEntry>> {
        let pattern = Self::query_pattern(base_url);
        tracing::debug!(endpoint = %self.endpoint, pattern = %pattern, "Querying snapshot index");

        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .query(&[
                ("url", pattern.as_str()),
                ("output", "json"),
                ("fl", "timestamp,original"),
                ("filter", "statuscode:200"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Status {
                base_url: base_url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await?;
        parse_index_rows(base_url, &body)
    }
}

#[async_trait]
impl SnapshotSource for CdxIndex {
    async fn resolve_snapshots(&self, base_url: &str) -> Result<Vec<SnapshotEntry>> {
        let entries = fetch_with_retry(&self.retry, || self.query_once(base_url)).await?;
        tracing::info!(base_url = %base_url, entries = entries.len(), "Resolved snapshot index");
        Ok(entries)
    }
}

/// Turn a CDX JSON table into entries, dropping the header row
///
/// An empty body or an empty table means the site has no captures.
/// Rows with fewer than two columns are skipped.
pub fn parse_index_rows(base_url: &str, body: &str) -> Result<Vec<SnapshotEntry>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> = serde_json::from_str(body).map_err(|e| {
        Error::Index(IndexError::Malformed {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })
    })?;

    let entries = rows
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            if row.len() < 2 {
                tracing::warn!(base_url = %base_url, row = ?row, "Skipping short index row");
                return None;
            }
            let mut columns = row.into_iter();
            let timestamp = columns.next()?;
            let original_url = columns.next()?;
            Some(SnapshotEntry::new(timestamp, original_url))
        })
        .collect();

    Ok(entries)
}
