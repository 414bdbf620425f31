//! Public read-only view endpoints.
//!
//! Resolution failures (unknown, expired, or malformed targets) all map to
//! the same not-found presentation, distinct from transient backend errors.

use axum::extract::{Path, Query, State};
use chrono::Utc;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{LegacyViewQuery, ProjectView};
use crate::share;
use crate::AppState;

/// GET /view/{short_id} - Resolve a share link to its read-only project.
pub async fn view_shared_project(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> ApiResult<ProjectView> {
    let project = state
        .repo
        .resolve_share_link(&short_id, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("This project doesn't exist or has been removed".to_string()))?;

    success(ProjectView::from_project(project))
}

/// GET /view/legacy?data=...&link=... - Resolve a legacy self-contained link.
///
/// The project travels base64-encoded in the URL itself; expiration applies
/// only when the client names a migrated link id.
pub async fn view_legacy_project(
    State(state): State<AppState>,
    Query(query): Query<LegacyViewQuery>,
) -> ApiResult<ProjectView> {
    if !state.config.enable_legacy_links {
        return Err(AppError::NotFound(
            "Legacy links are not enabled".to_string(),
        ));
    }

    if let Some(link_id) = &query.link {
        if state.repo.legacy_link_expired(link_id, Utc::now()).await? {
            return Err(AppError::NotFound(
                "This project doesn't exist or has been removed".to_string(),
            ));
        }
    }

    let project = share::decode_legacy_project(&query.data)?;
    success(ProjectView::from_project(project))
}
