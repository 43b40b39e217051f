use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    utils::{Claims, error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{CreatePhotoRequest, Photo};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoIdRequest {
    pub photo_id: String,
}

#[axum::debug_handler]
pub async fn create_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePhotoRequest>,
) -> impl IntoResponse {
    match Photo::create(&state.pool, req, &claims.sub).await {
        Ok(photo) => (StatusCode::CREATED, success_to_api_response(photo)),
        Err(e) => {
            tracing::error!("Failed to create photo: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to create photo".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn list_photos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    match Photo::list_recent(&state.pool, limit).await {
        Ok(photos) => (StatusCode::OK, success_to_api_response(photos)),
        Err(e) => {
            tracing::error!("Failed to list photos: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to fetch photos".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn user_photos(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match Photo::list_by_user(&state.pool, &query.user_id).await {
        Ok(photos) => (StatusCode::OK, success_to_api_response(photos)),
        Err(e) => {
            tracing::error!("Failed to list photos for {}: {:?}", query.user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to fetch photos".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn like_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PhotoIdRequest>,
) -> impl IntoResponse {
    match Photo::like(&state.pool, &req.photo_id, &claims.sub).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "success": true })),
        ),
        Err(e) => {
            tracing::error!("Failed to like photo {}: {:?}", req.photo_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to like photo".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn unlike_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PhotoIdRequest>,
) -> impl IntoResponse {
    match Photo::unlike(&state.pool, &req.photo_id, &claims.sub).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "success": true })),
        ),
        Err(e) => {
            tracing::error!("Failed to unlike photo {}: {:?}", req.photo_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to unlike photo".to_string(),
                ),
            )
        }
    }
}
