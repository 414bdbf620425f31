//! Pin placement and status API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Pin, PlacePinRequest, UpdatePinStatusRequest};
use crate::placement::{ClickOutcome, ClickPoint, ImageBounds, Placement};
use crate::AppState;

/// POST /api/projects/{id}/pinshots/{pinshot_id}/pins - Place a pin.
///
/// Drives the placement state machine with the raw click: clicks outside the
/// rendered bounds and empty comments are rejected, so stored positions are
/// always within [0, 100] on both axes.
pub async fn place_pin(
    State(state): State<AppState>,
    Path((project_id, pinshot_id)): Path<(String, String)>,
    Json(request): Json<PlacePinRequest>,
) -> ApiResult<Pin> {
    let bounds = ImageBounds::new(request.bounds_width, request.bounds_height)
        .ok_or_else(|| AppError::Validation("Image bounds must be positive".to_string()))?;
    let click = ClickPoint {
        x: request.click_x,
        y: request.click_y,
    };

    let mut placement = Placement::new();
    match placement.click_image(click, bounds) {
        ClickOutcome::PlacementStarted => {}
        _ => {
            return Err(AppError::Validation(
                "Click is outside the image bounds".to_string(),
            ));
        }
    }

    placement.set_comment(request.comment.trim());
    if let Some(color) = request.color {
        placement.set_color(color);
    }

    let pin = placement
        .confirm()
        .ok_or_else(|| AppError::Validation("Comment is required".to_string()))?;

    state.repo.add_pin(&project_id, &pinshot_id, &pin).await?;
    success(pin)
}

/// PUT /api/projects/{id}/pinshots/{pinshot_id}/pins/{pin_id}/status -
/// Toggle a pin between pending and resolved.
pub async fn update_pin_status(
    State(state): State<AppState>,
    Path((project_id, pinshot_id, pin_id)): Path<(String, String, String)>,
    Json(request): Json<UpdatePinStatusRequest>,
) -> ApiResult<Pin> {
    let pin = state
        .repo
        .update_pin_status(&project_id, &pinshot_id, &pin_id, request.status)
        .await?;
    success(pin)
}
