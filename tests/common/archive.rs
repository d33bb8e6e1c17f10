//! A mock Wayback Machine: CDX index plus time-travel captures

use tempfile::TempDir;
use wayback_mirror::{CdxIndex, Config, WaybackMirror};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock archive and a temp backups directory (kept alive with the struct)
pub struct MockArchive {
    /// Serves both `/cdx/search/cdx` and `/web/<ts>id_/<url>`
    pub server: MockServer,
    /// Backups directory runs write into
    pub backups: TempDir,
}

impl MockArchive {
    /// Start an empty archive
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            backups: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Config pointing at this archive, without retries
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.archive.index_url = format!("{}/cdx/search/cdx", self.server.uri());
        config.archive.wayback_url = self.server.uri();
        config.mirror.backups_dir = self.backups.path().to_path_buf();
        config.retry.max_attempts = 0;
        config
    }

    /// A mirror using [`config`](Self::config)
    pub fn mirror(&self) -> WaybackMirror {
        WaybackMirror::new(self.config()).expect("valid config")
    }

    /// Serve the index for `base_url`
    pub async fn index(&self, base_url: &str, rows: &[(&str, &str)]) {
        let mut table = vec![vec!["timestamp".to_string(), "original".to_string()]];
        table.extend(
            rows.iter()
                .map(|(ts, url)| vec![ts.to_string(), url.to_string()]),
        );

        Mock::given(method("GET"))
            .and(path("/cdx/search/cdx"))
            .and(query_param("url", CdxIndex::query_pattern(base_url)))
            .respond_with(ResponseTemplate::new(200).set_body_json(table))
            .mount(&self.server)
            .await;
    }

    /// Serve a capture; `original_url` must not carry a query string
    pub async fn capture(&self, timestamp: &str, original_url: &str, body: impl AsRef<[u8]>) {
        Mock::given(method("GET"))
            .and(path(format!("/web/{timestamp}id_/{original_url}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_ref().to_vec()))
            .mount(&self.server)
            .await;
    }
}
