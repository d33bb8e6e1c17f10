//! Time-travel fetches of single captures.

use crate::error::{FetchError, Result};
use crate::mirror::MirrorWriter;
use crate::retry::fetch_with_retry;
use crate::types::{Event, ResourceKind, SnapshotEntry, StoredResource};
use std::path::Path;
use tokio_stream::StreamExt;

use super::WaybackMirror;

/// Address of a capture's unmodified bytes
///
/// The `id_` suffix asks the archive for the original payload, without the
/// banner and link rewriting it applies to regular playback.
///
/// ```
/// use wayback_mirror::SnapshotEntry;
/// use wayback_mirror::downloader::time_travel_address;
///
/// let entry = SnapshotEntry::new("20200101000000", "http://example.com/");
/// assert_eq!(
///     time_travel_address("https://web.archive.org", &entry),
///     "https://web.archive.org/web/20200101000000id_/http://example.com/"
/// );
/// ```
pub fn time_travel_address(wayback_url: &str, entry: &SnapshotEntry) -> String {
    format!(
        "{}/web/{}id_/{}",
        wayback_url.trim_end_matches('/'),
        entry.timestamp,
        entry.original_url
    )
}

impl WaybackMirror {
    /// Fetch one capture and persist it at its derived path
    pub(crate) async fn store_capture(
        &self,
        entry: &SnapshotEntry,
        kind: ResourceKind,
        writer: &MirrorWriter,
    ) -> Result<StoredResource> {
        let address = time_travel_address(&self.config.archive.wayback_url, entry);
        let path = writer.local_path(&entry.original_url)?;

        let bytes = fetch_with_retry(&self.config.retry, || {
            self.fetch_once(&address, &path, writer)
        })
        .await?;

        tracing::info!(kind = ?kind, bytes, "{} -> {}", address, path.display());
        self.emit(Event::ResourceStored {
            url: entry.original_url.clone(),
            kind,
            path: path.clone(),
            bytes,
        });

        Ok(StoredResource {
            address,
            path,
            bytes,
        })
    }

    async fn fetch_once(&self, address: &str, path: &Path, writer: &MirrorWriter) -> Result<u64> {
        tracing::debug!(address = %address, "Fetching capture");
        let idle = self.config.archive.idle_timeout;

        let response = tokio::time::timeout(idle, self.client.get(address).send())
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("No response from {} within {}s", address, idle.as_secs()),
                )
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                address: address.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        // Only a stalled body fails the fetch; total transfer time is unbounded.
        let body = response.bytes_stream().timeout(idle).map(|chunk| match chunk {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("no data received for {}s", idle.as_secs())),
        });

        writer.write_stream(path, address, Box::pin(body)).await
    }
}
