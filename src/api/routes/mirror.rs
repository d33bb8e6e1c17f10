//! Download trigger handler.

use crate::api::AppState;
use crate::api::routes::DownloadQuery;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

const MISSING_URL: &str = "URL parameter is required";
const INVALID_URL: &str = "URL parameter is not a valid URL";
const RUN_FAILED: &str = "An error occurred while downloading snapshots";

/// GET /download - Mirror every archived capture of a site
///
/// Runs to completion before responding. The site is written under
/// `<backups_dir>/<sanitized hostname>`.
#[utoipa::path(
    get,
    path = "/download",
    tag = "mirror",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Site mirrored", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or invalid URL", body = String, content_type = "text/plain"),
        (status = 500, description = "The run failed", body = String, content_type = "text/plain")
    )
)]
pub async fn download_site(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(url) = query.url.filter(|url| !url.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, MISSING_URL).into_response();
    };

    let backup_root = match state.mirror.backup_root_for(&url) {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Rejected download request");
            return (StatusCode::BAD_REQUEST, INVALID_URL).into_response();
        }
    };

    match state.mirror.run(&url, &backup_root).await {
        Ok(_) => (
            StatusCode::OK,
            format!(
                "Downloaded snapshots of {} to {}",
                url,
                backup_root.display()
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(url = %url, error = %e, "Download request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, RUN_FAILED).into_response()
        }
    }
}
