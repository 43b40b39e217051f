use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

/// Notification kinds. Only `nearby_tour` is produced by the proximity
/// pass; the rest are written by other parts of the application.
pub const KIND_NEARBY_TOUR: &str = "nearby_tour";

#[derive(Debug, Serialize, FromRow)]
pub struct Notification {
    pub notification_id: String,
    pub user_id: String,
    pub tour_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// One row to be materialized by the bulk insert.
#[derive(Debug)]
pub struct NewNotification {
    pub user_id: String,
    pub tour_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub distance_km: f64,
}

/// Tour summary embedded in a notification listing. All fields come from
/// a LEFT JOIN, so a deleted tour leaves the notification row intact with
/// the summary absent.
#[derive(Debug, Serialize)]
pub struct TourSummary {
    pub tour_id: String,
    pub title: String,
    pub start_location: String,
    pub start_date: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub notification_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub tour: Option<TourSummary>,
}

#[derive(Debug, FromRow)]
struct NotificationListRow {
    notification_id: String,
    kind: String,
    title: String,
    message: String,
    is_read: bool,
    distance_km: Option<f64>,
    created_at: DateTime<Utc>,
    tour_id: Option<String>,
    tour_title: Option<String>,
    tour_start_location: Option<String>,
    tour_start_date: Option<DateTime<Utc>>,
    tour_image_url: Option<String>,
}

impl From<NotificationListRow> for NotificationView {
    fn from(row: NotificationListRow) -> Self {
        let tour = match (
            row.tour_id,
            row.tour_title,
            row.tour_start_location,
            row.tour_start_date,
        ) {
            (Some(tour_id), Some(title), Some(start_location), Some(start_date)) => {
                Some(TourSummary {
                    tour_id,
                    title,
                    start_location,
                    start_date,
                    image_url: row.tour_image_url,
                })
            }
            _ => None,
        };

        Self {
            notification_id: row.notification_id,
            kind: row.kind,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            distance_km: row.distance_km,
            created_at: row.created_at,
            tour,
        }
    }
}

impl Notification {
    /// Persists one batch of notifications as a single multi-row insert.
    /// An empty batch issues no statement at all.
    pub async fn create_batch(
        pool: &PgPool,
        notifications: &[NewNotification],
    ) -> Result<u64, sqlx::Error> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO notifications \
             (notification_id, user_id, tour_id, kind, title, message, is_read, distance_km, created_at) ",
        );

        builder.push_values(notifications, |mut b, n| {
            b.push_bind(Uuid::new_v4().to_string())
                .push_bind(&n.user_id)
                .push_bind(&n.tour_id)
                .push_bind(&n.kind)
                .push_bind(&n.title)
                .push_bind(&n.message)
                .push_bind(false)
                .push_bind(n.distance_km)
                .push("NOW()");
        });

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// A user's notifications, most recent first, with the source tour
    /// summary joined in where the tour still exists.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<NotificationView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NotificationListRow>(
            r#"
            SELECT
                n.notification_id, n.kind, n.title, n.message, n.is_read,
                n.distance_km, n.created_at,
                t.tour_id AS tour_id,
                t.title AS tour_title,
                t.start_location AS tour_start_location,
                t.start_date AS tour_start_date,
                t.image_url AS tour_image_url
            FROM notifications n
            LEFT JOIN tours t ON t.tour_id = n.tour_id
            WHERE n.user_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(NotificationView::from).collect())
    }

    /// Flips `is_read` for a notification owned by `user_id`. The update
    /// is scoped to the owner, so another user's notification id simply
    /// matches nothing; like a repeated call on an already-read row, that
    /// still reports success.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: &str,
        user_id: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true
            WHERE notification_id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(true)
    }

    pub async fn unread_count(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
