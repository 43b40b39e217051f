use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    utils::{
        Claims, error_codes, error_to_api_response, generate_token, success_to_api_response,
        verify_password,
    },
};

use super::model::{
    AuthResponse, LocationSettingsUpdate, LoginRequest, RegisterRequest, User, UserProfile,
};

// UI bound on the notification radius, applied here so the preference
// manager itself stays validation-free.
const MIN_NOTIFICATION_RADIUS_KM: i32 = 5;
const MAX_NOTIFICATION_RADIUS_KM: i32 = 200;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    if !req.email.contains('@') {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, "Invalid email".to_string()),
        );
    }

    match User::create(&state.pool, req).await {
        Ok(user) => match generate_token(&user.user_id, &state.config) {
            Ok((token, _)) => (
                StatusCode::CREATED,
                success_to_api_response(AuthResponse {
                    user_id: user.user_id,
                    email: user.email,
                    token,
                }),
            ),
            Err(_) => (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to generate token".to_string(),
                ),
            ),
        },
        Err(e) => {
            if e.to_string().contains("unique constraint")
                || e.to_string().contains("duplicate key")
            {
                (
                    StatusCode::OK,
                    error_to_api_response(
                        error_codes::USER_EXISTS,
                        "Email already registered".to_string(),
                    ),
                )
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                (
                    StatusCode::OK,
                    error_to_api_response(
                        error_codes::INTERNAL_ERROR,
                        "Failed to create user".to_string(),
                    ),
                )
            }
        }
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = match User::find_by_email(&state.pool, &req.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::AUTH_FAILED, "Invalid credentials".to_string()),
            );
        }
        Err(e) => {
            tracing::error!("Login lookup failed: {:?}", e);
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "Database error".to_string()),
            );
        }
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => match generate_token(&user.user_id, &state.config) {
            Ok((token, _)) => (
                StatusCode::OK,
                success_to_api_response(AuthResponse {
                    user_id: user.user_id,
                    email: user.email,
                    token,
                }),
            ),
            Err(_) => (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to generate token".to_string(),
                ),
            ),
        },
        _ => (
            StatusCode::OK,
            error_to_api_response(error_codes::AUTH_FAILED, "Invalid credentials".to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    match User::find_by_id(&state.pool, &claims.sub).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            success_to_api_response(UserProfile::from(user)),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "User not found".to_string()),
        ),
        Err(e) => {
            tracing::error!("Failed to load user {}: {:?}", claims.sub, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, "Database error".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn update_location_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(mut req): Json<LocationSettingsUpdate>,
) -> impl IntoResponse {
    if let Some(radius) = req.notification_radius {
        req.notification_radius =
            Some(radius.clamp(MIN_NOTIFICATION_RADIUS_KM, MAX_NOTIFICATION_RADIUS_KM));
    }

    match User::update_location_settings(&state.pool, &claims.sub, &req).await {
        Ok(updated) => (
            StatusCode::OK,
            success_to_api_response(serde_json::json!({ "success": updated })),
        ),
        Err(e) => {
            tracing::error!(
                "Failed to update location settings for {}: {:?}",
                claims.sub,
                e
            );
            (
                StatusCode::OK,
                success_to_api_response(serde_json::json!({ "success": false })),
            )
        }
    }
}
