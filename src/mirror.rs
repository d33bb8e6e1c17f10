//! Local mirror layout and persistence
//!
//! Every archived resource lands at a path derived from its original URL alone:
//!
//! ```text
//! <backups_dir>/<site host>/<resource host>/<url path, sanitized>[/index.html]
//! ```
//!
//! The capture timestamp never takes part in the path, so re-fetching the same
//! URL (as an index entry and again as a page asset, or from two captures)
//! overwrites the same file.

use crate::error::{Error, FetchError, Result};
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use url::Url;

/// File name used for directory-like URLs
pub const DIRECTORY_INDEX: &str = "index.html";

/// Characters that are not safe in file names on every platform
const RESERVED_CHARS: &[char] = &[':', '*', '?', '&', '=', '<', '>', '\\', '|'];

/// Suffix of the in-progress file a capture is streamed into before it replaces the target
const PARTIAL_SUFFIX: &str = ".part";

/// Replace every reserved character (`: * ? & = < > \ |`) with `_`
///
/// ```
/// use wayback_mirror::mirror::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a:b.png"), "a_b.png");
/// assert_eq!(sanitize_filename("page?id=1&x=2"), "page_id_1_x_2");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Backup root for a site: `<backups_dir>/<sanitized hostname>`
pub fn backup_root(backups_dir: &Path, site_url: &str) -> Result<PathBuf> {
    let url = parse_url(site_url)?;
    let host = url.host_str().ok_or_else(|| Error::InvalidUrl {
        url: site_url.to_string(),
        reason: "URL has no host".to_string(),
    })?;
    Ok(backups_dir.join(sanitize_filename(host)))
}

/// Whether a sanitized URL path names a directory rather than a file
///
/// A path is directory-like when it ends with `/` or its last segment has no
/// extension. Any dot counts as an extension, so `/v1.2` is treated as a file.
pub fn is_directory_like(path: &str) -> bool {
    if path.is_empty() || path.ends_with('/') {
        return true;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    Path::new(last).extension().is_none()
}

/// Local path of a resource, relative to the backup root
///
/// The host (with port, when explicit) forms the first component so that
/// assets served from other hosts do not collide with the site's own files.
/// The rest comes from the URL text as written: reserved characters are
/// replaced before splitting on `/`, so `a\b.png` and `a/b.png` stay distinct.
/// Query strings are kept as part of the file name; fragments are dropped.
///
/// ```
/// use std::path::PathBuf;
/// use wayback_mirror::mirror::derive_path;
///
/// assert_eq!(
///     derive_path("http://example.com/").unwrap(),
///     PathBuf::from("example.com/index.html")
/// );
/// assert_eq!(
///     derive_path("http://example.com/css/site.css").unwrap(),
///     PathBuf::from("example.com/css/site.css")
/// );
/// ```
pub fn derive_path(original_url: &str) -> Result<PathBuf> {
    let url = parse_url(original_url)?;
    let host = url.host_str().ok_or_else(|| Error::InvalidUrl {
        url: original_url.to_string(),
        reason: "URL has no host".to_string(),
    })?;

    let host_segment = match url.port() {
        Some(port) => sanitize_filename(&format!("{host}:{port}")),
        None => sanitize_filename(host),
    };

    let resource = sanitize_filename(raw_resource(original_url));

    let mut segments: Vec<&str> = Vec::new();
    for segment in resource.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    let mut path = PathBuf::from(host_segment);
    path.extend(segments);

    if is_directory_like(&resource) {
        path.push(DIRECTORY_INDEX);
    }

    Ok(path)
}

/// Path and query of a URL exactly as written, without the fragment
///
/// The parsed form cannot be used here: it turns `\` into `/` and
/// percent-encodes characters that would otherwise be sanitized.
fn raw_resource(original_url: &str) -> &str {
    let trimmed = original_url.trim();
    let after_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    let without_fragment = after_scheme.split('#').next().unwrap_or_default();

    match without_fragment.find(|c: char| matches!(c, '/' | '?' | '\\')) {
        Some(start) => &without_fragment[start..],
        None => "",
    }
}

/// Whether a derived path is a directory index (and therefore a page to scan)
pub fn is_directory_index(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == DIRECTORY_INDEX)
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Writes captures under one backup root
///
/// Writes to the same local path are serialized: a page that is both an index
/// entry and an asset of another page can be targeted twice, and the two
/// streams must never interleave in one file.
#[derive(Debug)]
pub struct MirrorWriter {
    root: PathBuf,
    path_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl MirrorWriter {
    /// Create a writer rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            path_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Backup root this writer persists under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute local path for an original URL
    pub fn local_path(&self, original_url: &str) -> Result<PathBuf> {
        Ok(self.root.join(derive_path(original_url)?))
    }

    /// Stream a body into `path`, replacing any previous file there
    ///
    /// The body is written to a sibling `.part` file that is renamed over the
    /// target once the stream completes. On failure the partial file is removed
    /// and an earlier capture at `path`, if any, is left untouched.
    ///
    /// `address` identifies the source in errors.
    pub async fn write_stream<S, B, E>(&self, path: &Path, address: &str, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let lock = self.lock_for(path).await;
        let _guard = lock.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory '{}': {}", parent.display(), e),
                ))
            })?;
        }

        let partial = partial_path(path);
        match stream_to_file(&partial, path, address, body).await {
            Ok(written) => {
                tokio::fs::rename(&partial, path).await.map_err(|e| {
                    Error::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to move capture into '{}': {}", path.display(), e),
                    ))
                })?;
                Ok(written)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await
                    && cleanup.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(
                        path = %partial.display(),
                        error = %cleanup,
                        "Failed to remove partial file"
                    );
                }
                Err(e)
            }
        }
    }

    /// Write a complete buffer to `path`
    pub async fn write(&self, path: &Path, bytes: &[u8]) -> Result<u64> {
        let body = futures::stream::iter([Ok::<_, std::convert::Infallible>(bytes)]);
        self.write_stream(path, &path.display().to_string(), body)
            .await
    }

    /// Read back a stored page as text (invalid UTF-8 is replaced)
    pub async fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read '{}': {}", path.display(), e),
            ))
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.path_locks.lock().await;
        locks.entry(path.to_path_buf()).or_default().clone()
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

async fn stream_to_file<S, B, E>(
    partial: &Path,
    target: &Path,
    address: &str,
    mut body: S,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let file = tokio::fs::File::create(partial).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create '{}': {}", partial.display(), e),
        ))
    })?;
    let mut writer = tokio::io::BufWriter::new(file);
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| FetchError::Stream {
            address: address.to_string(),
            path: target.to_path_buf(),
            reason: e.to_string(),
        })?;
        let chunk = chunk.as_ref();
        writer.write_all(chunk).await?;
        written += chunk.len() as u64;
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(written)
}
