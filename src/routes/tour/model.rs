use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tour {
    pub tour_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_location: String,
    pub end_location: String,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_participants: i32,
    pub difficulty: String,
    pub distance_miles: Option<i32>,
    pub image_url: Option<String>,
    pub created_by_id: String,
    pub is_active: bool,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TourStop {
    pub stop_id: String,
    pub tour_id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub stop_type: String,
    pub position: i32,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TourParticipant {
    pub participant_id: String,
    pub tour_id: String,
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
    pub status: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TourReview {
    pub review_id: String,
    pub tour_id: String,
    pub user_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStopRequest {
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub stop_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_location: String,
    pub end_location: String,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_participants: i32,
    pub difficulty: Option<String>,
    pub distance_miles: Option<i32>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub stops: Vec<CreateStopRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub tour_id: String,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TourDetail {
    #[serde(flatten)]
    pub tour: Tour,
    pub stops: Vec<TourStop>,
    pub participants: Vec<TourParticipant>,
    pub reviews: Vec<TourReview>,
}

const TOUR_COLUMNS: &str = "tour_id, title, description, start_location, end_location, \
     start_latitude, start_longitude, end_latitude, end_longitude, \
     start_date, end_date, max_participants, difficulty, distance_miles, \
     image_url, created_by_id, is_active, is_closed, created_at";

impl Tour {
    /// Inserts the tour and its ordered stops in one transaction.
    pub async fn create(
        pool: &PgPool,
        req: CreateTourRequest,
        created_by_id: &str,
    ) -> Result<Self, sqlx::Error> {
        let tour_id = Uuid::new_v4().to_string();
        let difficulty = req.difficulty.unwrap_or_else(|| "moderate".to_string());

        let mut tx = pool.begin().await?;

        let tour = sqlx::query_as::<_, Tour>(&format!(
            r#"
            INSERT INTO tours (
                tour_id, title, description, start_location, end_location,
                start_latitude, start_longitude, end_latitude, end_longitude,
                start_date, end_date, max_participants, difficulty, distance_miles,
                image_url, created_by_id, is_active, is_closed, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, true, false, NOW())
            RETURNING {TOUR_COLUMNS}
            "#
        ))
        .bind(&tour_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.start_location)
        .bind(&req.end_location)
        .bind(req.start_latitude)
        .bind(req.start_longitude)
        .bind(req.end_latitude)
        .bind(req.end_longitude)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.max_participants)
        .bind(&difficulty)
        .bind(req.distance_miles)
        .bind(&req.image_url)
        .bind(created_by_id)
        .fetch_one(&mut *tx)
        .await?;

        for (index, stop) in req.stops.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO tour_stops (stop_id, tour_id, name, description, location, stop_type, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&tour_id)
            .bind(&stop.name)
            .bind(&stop.description)
            .bind(&stop.location)
            .bind(&stop.stop_type)
            .bind((index + 1) as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(tour)
    }

    pub async fn find_by_id(pool: &PgPool, tour_id: &str) -> Result<Option<Self>, sqlx::Error> {
        let tour = sqlx::query_as::<_, Tour>(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours WHERE tour_id = $1"
        ))
        .bind(tour_id)
        .fetch_optional(pool)
        .await?;

        Ok(tour)
    }

    /// Open tours, newest first.
    pub async fn list_active(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tours = sqlx::query_as::<_, Tour>(&format!(
            r#"
            SELECT {TOUR_COLUMNS} FROM tours
            WHERE is_active = true AND is_closed = false
            ORDER BY created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(tours)
    }

    pub async fn list_by_creator(pool: &PgPool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        let tours = sqlx::query_as::<_, Tour>(&format!(
            r#"
            SELECT {TOUR_COLUMNS} FROM tours
            WHERE created_by_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tours)
    }

    pub async fn join(pool: &PgPool, tour_id: &str, user_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tour_participants (participant_id, tour_id, user_id, joined_at, status)
            VALUES ($1, $2, $3, NOW(), 'joined')
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(tour_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Leaving flips the participation status; the row stays for history.
    pub async fn leave(pool: &PgPool, tour_id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tour_participants
            SET status = 'left'
            WHERE tour_id = $1 AND user_id = $2 AND status = 'joined'
            "#,
        )
        .bind(tour_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Only the creator may close a tour; closing is irreversible.
    pub async fn close(pool: &PgPool, tour_id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tours
            SET is_closed = true
            WHERE tour_id = $1 AND created_by_id = $2
            "#,
        )
        .bind(tour_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn stops(pool: &PgPool, tour_id: &str) -> Result<Vec<TourStop>, sqlx::Error> {
        let stops = sqlx::query_as::<_, TourStop>(
            r#"
            SELECT stop_id, tour_id, name, description, location, stop_type, position
            FROM tour_stops
            WHERE tour_id = $1
            ORDER BY position
            "#,
        )
        .bind(tour_id)
        .fetch_all(pool)
        .await?;

        Ok(stops)
    }

    pub async fn participants(
        pool: &PgPool,
        tour_id: &str,
    ) -> Result<Vec<TourParticipant>, sqlx::Error> {
        let participants = sqlx::query_as::<_, TourParticipant>(
            r#"
            SELECT
                p.participant_id, p.tour_id, p.user_id, p.joined_at, p.status,
                u.first_name, u.last_name, u.profile_image_url
            FROM tour_participants p
            INNER JOIN users u ON u.user_id = p.user_id
            WHERE p.tour_id = $1 AND p.status = 'joined'
            "#,
        )
        .bind(tour_id)
        .fetch_all(pool)
        .await?;

        Ok(participants)
    }

    pub async fn reviews(pool: &PgPool, tour_id: &str) -> Result<Vec<TourReview>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, TourReview>(
            r#"
            SELECT
                r.review_id, r.tour_id, r.user_id, r.rating, r.comment, r.created_at,
                u.first_name, u.last_name
            FROM tour_reviews r
            INNER JOIN users u ON u.user_id = r.user_id
            WHERE r.tour_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(tour_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    pub async fn add_review(
        pool: &PgPool,
        req: &CreateReviewRequest,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tour_reviews (review_id, tour_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.tour_id)
        .bind(user_id)
        .bind(req.rating)
        .bind(&req.comment)
        .execute(pool)
        .await?;

        Ok(())
    }
}
