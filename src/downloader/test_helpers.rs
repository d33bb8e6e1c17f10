//! Shared test helpers for running a WaybackMirror against a mock archive.

use crate::config::Config;
use crate::downloader::WaybackMirror;
use crate::index::CdxIndex;
use std::path::Path;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Capture time used by most fixtures
pub(crate) const TS: &str = "20200101000000";

/// Config pointing both the index and the time-travel endpoint at `server`.
/// Retries are disabled so failing fetches fail fast.
pub(crate) fn test_config(server: &MockServer, backups_dir: &Path) -> Config {
    let mut config = Config::default();
    config.archive.index_url = format!("{}/cdx/search/cdx", server.uri());
    config.archive.wayback_url = server.uri();
    config.archive.request_timeout = Duration::from_secs(5);
    config.mirror.backups_dir = backups_dir.to_path_buf();
    config.retry.max_attempts = 0;
    config.retry.jitter = false;
    config
}

/// Mock archive plus a mirror writing into a temp backups directory.
/// The tempdir must be kept alive for the duration of the test.
pub(crate) async fn create_test_mirror() -> (WaybackMirror, MockServer, TempDir) {
    create_test_mirror_with(|_| {}).await
}

/// Like [`create_test_mirror`], with a chance to adjust the config first
pub(crate) async fn create_test_mirror_with(
    adjust: impl FnOnce(&mut Config),
) -> (WaybackMirror, MockServer, TempDir) {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();

    let mut config = test_config(&server, temp_dir.path());
    adjust(&mut config);

    let mirror = WaybackMirror::new(config).unwrap();
    (mirror, server, temp_dir)
}

/// Serve a CDX table (header row plus `rows`) for `base_url`
pub(crate) async fn mount_index(server: &MockServer, base_url: &str, rows: &[(&str, &str)]) {
    let mut table = vec![vec!["timestamp".to_string(), "original".to_string()]];
    table.extend(
        rows.iter()
            .map(|(ts, url)| vec![ts.to_string(), url.to_string()]),
    );

    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("url", CdxIndex::query_pattern(base_url)))
        .respond_with(ResponseTemplate::new(200).set_body_json(table))
        .mount(server)
        .await;
}

/// Path the time-travel request for a query-free URL arrives on
pub(crate) fn capture_path(timestamp: &str, original_url: &str) -> String {
    format!("/web/{timestamp}id_/{original_url}")
}

/// Mock for one capture, returned so callers can add expectations before mounting
pub(crate) fn capture(timestamp: &str, original_url: &str, body: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path(capture_path(timestamp, original_url)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
}

/// Serve one capture
pub(crate) async fn mount_capture(
    server: &MockServer,
    timestamp: &str,
    original_url: &str,
    body: &str,
) {
    capture(timestamp, original_url, body).mount(server).await;
}

/// Read a mirrored file relative to the backups directory
pub(crate) fn read_mirrored(backups: &TempDir, relative: &str) -> String {
    std::fs::read_to_string(backups.path().join(relative)).unwrap()
}

/// Every regular file under `dir`, relative to it, sorted
pub(crate) fn files_under(dir: &Path) -> Vec<String> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect()
}
