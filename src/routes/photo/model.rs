use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Serialize, FromRow)]
pub struct Photo {
    pub photo_id: String,
    pub user_id: String,
    pub tour_id: Option<String>,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Photo together with its author, for feed listings.
#[derive(Debug, Serialize, FromRow)]
pub struct PhotoWithAuthor {
    pub photo_id: String,
    pub user_id: String,
    pub tour_id: Option<String>,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePhotoRequest {
    pub tour_id: Option<String>,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
}

const PHOTO_WITH_AUTHOR_QUERY: &str = r#"
    SELECT
        p.photo_id, p.user_id, p.tour_id, p.image_url, p.caption,
        p.location, p.likes_count, p.created_at,
        u.first_name, u.last_name, u.profile_image_url
    FROM photos p
    INNER JOIN users u ON u.user_id = p.user_id
"#;

impl Photo {
    pub async fn create(
        pool: &PgPool,
        req: CreatePhotoRequest,
        user_id: &str,
    ) -> Result<Self, sqlx::Error> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (photo_id, user_id, tour_id, image_url, caption, location, likes_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, NOW())
            RETURNING photo_id, user_id, tour_id, image_url, caption, location, likes_count, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&req.tour_id)
        .bind(&req.image_url)
        .bind(&req.caption)
        .bind(&req.location)
        .fetch_one(pool)
        .await?;

        Ok(photo)
    }

    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PhotoWithAuthor>, sqlx::Error> {
        let photos = sqlx::query_as::<_, PhotoWithAuthor>(&format!(
            "{PHOTO_WITH_AUTHOR_QUERY} ORDER BY p.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(photos)
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<PhotoWithAuthor>, sqlx::Error> {
        let photos = sqlx::query_as::<_, PhotoWithAuthor>(&format!(
            "{PHOTO_WITH_AUTHOR_QUERY} WHERE p.user_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(photos)
    }

    /// Like and counter update move together in one transaction.
    pub async fn like(pool: &PgPool, photo_id: &str, user_id: &str) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO photo_likes (like_id, photo_id, user_id, created_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(photo_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE photos SET likes_count = likes_count + 1 WHERE photo_id = $1")
            .bind(photo_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn unlike(pool: &PgPool, photo_id: &str, user_id: &str) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM photo_likes WHERE photo_id = $1 AND user_id = $2")
            .bind(photo_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // Only decrement when a like row actually existed, so repeated
        // unlikes cannot drive the counter negative.
        if deleted.rows_affected() > 0 {
            sqlx::query("UPDATE photos SET likes_count = likes_count - 1 WHERE photo_id = $1")
                .bind(photo_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
