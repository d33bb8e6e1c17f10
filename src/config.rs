//! Configuration types for wayback-mirror

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Main configuration for [`WaybackMirror`](crate::WaybackMirror)
///
/// Fields are organized into logical sub-configs:
/// - [`archive`](ArchiveConfig): index and time-travel endpoints, HTTP client
/// - [`mirror`](MirrorConfig): backup location and run semantics
/// - [`retry`](RetryConfig): backoff for transient failures
/// - [`api`](ApiConfig): trigger API server
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Archive endpoints and HTTP client settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Local mirror settings
    #[serde(default)]
    pub mirror: MirrorConfig,

    /// Retry behavior for transient failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Trigger API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Check settings that cannot be expressed in the type system
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("archive.index_url", &self.archive.index_url),
            ("archive.wayback_url", &self.archive.wayback_url),
        ] {
            url::Url::parse(value).map_err(|e| Error::Config {
                message: format!("'{value}' is not a valid URL: {e}"),
                key: Some(key.to_string()),
            })?;
        }

        for (key, value) in [
            ("archive.request_timeout", self.archive.request_timeout),
            ("archive.connect_timeout", self.archive.connect_timeout),
            ("archive.idle_timeout", self.archive.idle_timeout),
        ] {
            if value.is_zero() {
                return Err(Error::Config {
                    message: "must be greater than zero".to_string(),
                    key: Some(key.to_string()),
                });
            }
        }

        if self.mirror.max_concurrent_assets == 0 {
            return Err(Error::Config {
                message: "must be at least 1".to_string(),
                key: Some("mirror.max_concurrent_assets".to_string()),
            });
        }

        if self.retry.backoff_multiplier <= 0.0 {
            return Err(Error::Config {
                message: "must be greater than zero".to_string(),
                key: Some("retry.backoff_multiplier".to_string()),
            });
        }

        Ok(())
    }
}

/// Wayback Machine endpoints and HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ArchiveConfig {
    /// CDX index endpoint (default: "http://web.archive.org/cdx/search/cdx")
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Base of the time-travel endpoint (default: "https://web.archive.org")
    ///
    /// Captures are fetched from `<wayback_url>/web/<timestamp>id_/<original url>`.
    #[serde(default = "default_wayback_url")]
    pub wayback_url: String,

    /// Deadline for one CDX index query, body included (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,

    /// Time allowed to establish a connection (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub connect_timeout: Duration,

    /// Longest silence tolerated while fetching a capture (default: 60 seconds)
    ///
    /// Applies to the wait for response headers and between body chunks, so a
    /// large capture may take as long as it needs while data keeps arriving.
    #[serde(default = "default_idle_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub idle_timeout: Duration,

    /// User-Agent header sent to the archive
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            wayback_url: default_wayback_url(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// What to do when a top-level snapshot entry cannot be fetched or stored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryFailurePolicy {
    /// Abort the whole run with the entry's error (default)
    #[default]
    Abort,
    /// Log the failure, record it in the summary, and continue with the next entry
    Continue,
}

/// Local mirror settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MirrorConfig {
    /// Parent of every per-host backup tree (default: "./backups")
    #[serde(default = "default_backups_dir")]
    #[schema(value_type = String)]
    pub backups_dir: PathBuf,

    /// Handling of failed top-level entries (default: abort)
    #[serde(default)]
    pub on_entry_failure: EntryFailurePolicy,

    /// Fetch each original URL at most once per run (default: false)
    ///
    /// When disabled, a URL that appears both as an index entry and as a
    /// discovered asset is fetched every time it is seen.
    #[serde(default)]
    pub skip_fetched: bool,

    /// Number of assets of one page fetched concurrently (default: 1, sequential)
    #[serde(default = "default_max_concurrent_assets")]
    pub max_concurrent_assets: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            backups_dir: default_backups_dir(),
            on_entry_failure: EntryFailurePolicy::default(),
            skip_fetched: false,
            max_concurrent_assets: default_max_concurrent_assets(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Trigger API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_index_url() -> String {
    "http://web.archive.org/cdx/search/cdx".to_string()
}

fn default_wayback_url() -> String {
    "https://web.archive.org".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("wayback-mirror/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_backups_dir() -> PathBuf {
    PathBuf::from("./backups")
}

fn default_max_concurrent_assets() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration <-> whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
