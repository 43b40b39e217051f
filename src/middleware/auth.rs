use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, verify_token},
};

/// Validates the Bearer token and makes the decoded claims available to
/// downstream handlers as a request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "));

    match token {
        Some(token) => match verify_token(token, &state.config) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
                next.run(request).await
            }
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    error_to_api_response::<()>(
                        error_codes::AUTH_FAILED,
                        "Invalid or expired token".to_string(),
                    ),
                )
                    .into_response()
            }
        },
        None => (
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(
                error_codes::AUTH_FAILED,
                "Missing Authorization header".to_string(),
            ),
        )
            .into_response(),
    }
}
