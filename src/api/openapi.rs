//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the wayback-mirror trigger API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the wayback-mirror trigger API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (when enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "wayback-mirror API",
        version = "0.1.0",
        description = "Trigger Wayback Machine site mirrors and follow their progress",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        crate::api::routes::download_site,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::SnapshotEntry,
        crate::types::ResourceKind,
        crate::types::StoredResource,
        crate::types::RunSummary,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::ArchiveConfig,
        crate::config::MirrorConfig,
        crate::config::EntryFailurePolicy,
        crate::config::RetryConfig,
        crate::config::ApiConfig,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "mirror", description = "Mirror a site from its archived captures"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
