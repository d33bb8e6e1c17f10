//! Trigger server example
//!
//! Runs the wayback-mirror HTTP API on port 3000 and mirrors sites on request.
//!
//! After starting, you can:
//! - Mirror a site via GET http://localhost:3000/download?url=http://example.com
//! - Stream progress via GET http://localhost:3000/events
//! - View Swagger UI at http://localhost:3000/swagger-ui
//!
//! Set `RUST_LOG=wayback_mirror=debug` for request-level logging.

use tracing_subscriber::EnvFilter;
use wayback_mirror::config::{Config, EntryFailurePolicy, MirrorConfig};
use wayback_mirror::{WaybackMirror, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config {
        mirror: MirrorConfig {
            backups_dir: "backups".into(),
            // Keep going past captures the archive can no longer serve
            on_entry_failure: EntryFailurePolicy::Continue,
            ..Default::default()
        },
        ..Default::default()
    };

    let mirror = WaybackMirror::new(config)?;

    println!("Server is running on http://localhost:3000");
    println!();
    println!("  # Mirror a site into ./backups/<host>");
    println!("  curl 'http://localhost:3000/download?url=http://example.com'");
    println!();
    println!("  # Stream events (Server-Sent Events)");
    println!("  curl -N http://localhost:3000/events");

    run_with_shutdown(mirror).await?;
    Ok(())
}
