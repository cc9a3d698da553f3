//! Notification read-surface handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use jobgrid_models::{Notification, NotificationId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// The caller's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        state.notifications.list_by_recipient(&user.user_id).await?,
    ))
}

/// Mark one notification as read. Recipient only.
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<NotificationId>,
) -> ApiResult<Json<Notification>> {
    let mut notification = state
        .notifications
        .get(&notification_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;

    if notification.recipient != user.user_id {
        return Err(ApiError::forbidden("Not your notification"));
    }

    state.notifications.mark_read(&notification_id).await?;
    notification.is_read = true;
    Ok(Json(notification))
}

/// Mark-all summary.
#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// Mark all of the caller's notifications as read.
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let updated = state.notifications.mark_all_read(&user.user_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
