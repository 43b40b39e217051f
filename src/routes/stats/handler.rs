use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

#[derive(Debug, Serialize)]
pub struct Stats {
    pub active_tours: i64,
    pub total_riders: i64,
    pub completed_tours: i64,
}

async fn load_stats(pool: &PgPool) -> Result<Stats, sqlx::Error> {
    let active_tours = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM tours WHERE is_active = true AND is_closed = false",
    )
    .fetch_one(pool)
    .await?;

    let total_riders = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT user_id) FROM tour_participants WHERE status = 'joined'",
    )
    .fetch_one(pool)
    .await?;

    let completed_tours =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tours WHERE is_closed = true")
            .fetch_one(pool)
            .await?;

    Ok(Stats {
        active_tours,
        total_riders,
        completed_tours,
    })
}

#[axum::debug_handler]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    match load_stats(&state.pool).await {
        Ok(stats) => (StatusCode::OK, success_to_api_response(stats)),
        Err(e) => {
            tracing::error!("Failed to load stats: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "Failed to fetch stats".to_string(),
                ),
            )
        }
    }
}
