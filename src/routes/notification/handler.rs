use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    utils::{Claims, success_to_api_response},
};

use super::model::Notification;

const DEFAULT_LIST_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub notification_id: String,
}

// The notification endpoints degrade instead of failing: a persistence
// error is logged and the caller gets the safe default (empty list, zero
// count, false success). A stale badge beats a broken page here.

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 100);

    let notifications = match Notification::list_for_user(&state.pool, &claims.sub, limit).await {
        Ok(notifications) => notifications,
        Err(e) => {
            tracing::error!("Failed to list notifications for {}: {:?}", claims.sub, e);
            Vec::new()
        }
    };

    (StatusCode::OK, success_to_api_response(notifications))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let count = match Notification::unread_count(&state.pool, &claims.sub).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count unread notifications for {}: {:?}", claims.sub, e);
            0
        }
    };

    (
        StatusCode::OK,
        success_to_api_response(serde_json::json!({ "count": count })),
    )
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<MarkReadRequest>,
) -> impl IntoResponse {
    let success = match Notification::mark_read(&state.pool, &req.notification_id, &claims.sub).await
    {
        Ok(success) => success,
        Err(e) => {
            tracing::error!(
                "Failed to mark notification {} read for {}: {:?}",
                req.notification_id,
                claims.sub,
                e
            );
            false
        }
    };

    (
        StatusCode::OK,
        success_to_api_response(serde_json::json!({ "success": success })),
    )
}
