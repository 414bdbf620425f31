//! Standalone image sharing API endpoints.
//!
//! Upload an image, register it under a short id, and collect anonymous
//! comments on it. No moderation and no edit/delete, by contract.

use axum::extract::{Multipart, Path, State};
use axum::Json;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateCommentRequest, ImageComment, ImageWithComments, SharedImage};
use crate::AppState;

/// POST /images - Upload an image and register it for sharing.
///
/// Multipart form with a `file` part plus optional `title` and `description`.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<SharedImage> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?,
                );
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?,
                );
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(AppError::Validation(
            "Please select an image to upload".to_string(),
        ));
    };
    if bytes.is_empty() {
        return Err(AppError::Validation(
            "Please select an image to upload".to_string(),
        ));
    }

    let storage_path = state.store.upload(&file_name, &bytes).await?;
    let image_url = state
        .store
        .public_url(&state.config.public_origin, &storage_path);

    let title = title.filter(|t| !t.trim().is_empty());
    let image = state
        .repo
        .create_shared_image(
            title.as_deref().unwrap_or("Untitled Image"),
            description.as_deref().unwrap_or(""),
            &image_url,
            &storage_path,
        )
        .await?;

    tracing::info!(short_id = %image.short_id, path = %image.storage_path, "Registered shared image");
    success(image)
}

/// GET /images/{short_id} - Fetch a shared image and its comments.
pub async fn get_image(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> ApiResult<ImageWithComments> {
    match state.repo.get_image_with_comments(&short_id).await? {
        Some(image) => success(image),
        None => Err(AppError::NotFound(format!("Image {} not found", short_id))),
    }
}

/// POST /images/{short_id}/comments - Post a comment on a shared image.
pub async fn create_image_comment(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<ImageComment> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Comment is required".to_string()));
    }

    let comment = state
        .repo
        .add_image_comment(
            &short_id,
            request.content.trim(),
            request.author_name.as_deref(),
        )
        .await?;
    success(comment)
}
