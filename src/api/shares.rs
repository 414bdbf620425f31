//! Share link API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateShareLinkRequest, RegisterLegacyLinkRequest, ShareLink};
use crate::AppState;

/// POST /api/projects/{id}/share-links - Create a share link.
///
/// Two links for the same project are independent; each mints its own short
/// id and both resolve to the project.
pub async fn create_share_link(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(request): Json<CreateShareLinkRequest>,
) -> ApiResult<ShareLink> {
    let link = state
        .repo
        .create_share_link(
            &project_id,
            request.expiration_days,
            &state.config.public_origin,
        )
        .await?;

    tracing::info!(
        project_id = %project_id,
        short_id = %link.short_id,
        expires_at = ?link.expires_at,
        "Created share link"
    );
    success(link)
}

/// GET /api/projects/{id}/share-links - List share links, newest first.
pub async fn list_share_links(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Vec<ShareLink>> {
    let links = state.repo.list_share_links(&project_id).await?;
    success(links)
}

/// POST /api/legacy-links - Register the expiration of a migrated legacy
/// link, keyed by link id.
///
/// Only available when legacy link support is enabled.
pub async fn register_legacy_link(
    State(state): State<AppState>,
    Json(request): Json<RegisterLegacyLinkRequest>,
) -> ApiResult<()> {
    if !state.config.enable_legacy_links {
        return Err(AppError::NotFound(
            "Legacy links are not enabled".to_string(),
        ));
    }
    if request.link_id.trim().is_empty() {
        return Err(AppError::Validation("Link id is required".to_string()));
    }

    state
        .repo
        .register_legacy_link(request.link_id.trim(), request.expires_at.as_deref())
        .await?;
    success(())
}
