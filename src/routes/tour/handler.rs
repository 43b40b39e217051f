use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    routes::notification,
    utils::{Claims, error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{CreateReviewRequest, CreateTourRequest, Tour, TourDetail};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub tour_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TourIdRequest {
    pub tour_id: String,
}

#[axum::debug_handler]
pub async fn create_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTourRequest>,
) -> impl IntoResponse {
    if req.end_date < req.start_date {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Tour end date precedes start date".to_string(),
            ),
        );
    }

    match Tour::create(&state.pool, req, &claims.sub).await {
        Ok(tour) => {
            // Notification delivery is best-effort and must never block or
            // fail tour creation. The task logs its own outcome.
            let pool = state.pool.clone();
            let tour_id = tour.tour_id.clone();
            tokio::spawn(async move {
                notification::notify_nearby_users(&pool, &tour_id).await;
            });

            (StatusCode::CREATED, success_to_api_response(tour))
        }
        Err(e) => {
            tracing::error!("Failed to create tour: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to create tour".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    match Tour::list_active(&state.pool, limit).await {
        Ok(tours) => (StatusCode::OK, success_to_api_response(tours)),
        Err(e) => {
            tracing::error!("Failed to list tours: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to fetch tours".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn get_tour_detail(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> impl IntoResponse {
    let tour = match Tour::find_by_id(&state.pool, &query.tour_id).await {
        Ok(Some(tour)) => tour,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_to_api_response(error_codes::NOT_FOUND, "Tour not found".to_string()),
            );
        }
        Err(e) => {
            tracing::error!("Failed to load tour {}: {:?}", query.tour_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, "Database error".to_string()),
            );
        }
    };

    let stops = Tour::stops(&state.pool, &query.tour_id).await;
    let participants = Tour::participants(&state.pool, &query.tour_id).await;
    let reviews = Tour::reviews(&state.pool, &query.tour_id).await;

    match (stops, participants, reviews) {
        (Ok(stops), Ok(participants), Ok(reviews)) => (
            StatusCode::OK,
            success_to_api_response(TourDetail {
                tour,
                stops,
                participants,
                reviews,
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(
                error_codes::INTERNAL_ERROR,
                "Failed to fetch tour detail".to_string(),
            ),
        ),
    }
}

#[axum::debug_handler]
pub async fn my_tours(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    match Tour::list_by_creator(&state.pool, &claims.sub).await {
        Ok(tours) => (StatusCode::OK, success_to_api_response(tours)),
        Err(e) => {
            tracing::error!("Failed to list tours for {}: {:?}", claims.sub, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to fetch tours".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn join_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TourIdRequest>,
) -> impl IntoResponse {
    match Tour::join(&state.pool, &req.tour_id, &claims.sub).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "success": true })),
        ),
        Err(e) => {
            tracing::error!("Failed to join tour {}: {:?}", req.tour_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to join tour".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn leave_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TourIdRequest>,
) -> impl IntoResponse {
    match Tour::leave(&state.pool, &req.tour_id, &claims.sub).await {
        Ok(true) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "success": true })),
        ),
        Ok(false) => (
            StatusCode::BAD_REQUEST,
            error_to_api_response(error_codes::NOT_FOUND, "Not a participant".to_string()),
        ),
        Err(e) => {
            tracing::error!("Failed to leave tour {}: {:?}", req.tour_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to leave tour".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn close_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TourIdRequest>,
) -> impl IntoResponse {
    match Tour::close(&state.pool, &req.tour_id, &claims.sub).await {
        Ok(true) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "success": true })),
        ),
        Ok(false) => (
            StatusCode::FORBIDDEN,
            error_to_api_response(
                error_codes::PERMISSION_DENIED,
                "Only the creator can close a tour".to_string(),
            ),
        ),
        Err(e) => {
            tracing::error!("Failed to close tour {}: {:?}", req.tour_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to close tour".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReviewRequest>,
) -> impl IntoResponse {
    if !(1..=5).contains(&req.rating) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Rating must be between 1 and 5".to_string(),
            ),
        );
    }

    match Tour::add_review(&state.pool, &req, &claims.sub).await {
        Ok(()) => (
            StatusCode::CREATED,
            success_to_api_response(serde_json::json!({ "success": true })),
        ),
        Err(e) => {
            tracing::error!("Failed to create review for {}: {:?}", req.tour_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to create review".to_string(),
                ),
            )
        }
    }
}
