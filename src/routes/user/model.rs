use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::utils::hash_password;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notification_radius: Option<i32>,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub token: String,
}

/// Public view of a user, safe to embed in other responses.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notification_radius: Option<i32>,
    pub notifications_enabled: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_image_url: user.profile_image_url,
            location: user.location,
            latitude: user.latitude,
            longitude: user.longitude,
            notification_radius: user.notification_radius,
            notifications_enabled: user.notifications_enabled,
        }
    }
}

/// Partial update of location and notification preferences. Fields left
/// as `None` keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct LocationSettingsUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<String>,
    pub notification_radius: Option<i32>,
    pub notifications_enabled: Option<bool>,
}

impl LocationSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.location.is_none()
            && self.notification_radius.is_none()
            && self.notifications_enabled.is_none()
    }
}

const USER_COLUMNS: &str = "user_id, email, password_hash, first_name, last_name, bio, \
     profile_image_url, location, latitude, longitude, notification_radius, \
     notifications_enabled, created_at, updated_at";

impl User {
    pub async fn create(pool: &PgPool, req: RegisterRequest) -> Result<Self, sqlx::Error> {
        let user_id = Uuid::new_v4().to_string();
        let password_hash = hash_password(&req.password)
            .map_err(|e| sqlx::Error::Protocol(format!("Failed to hash password: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (user_id, email, password_hash, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user_id)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, user_id: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies a partial settings update. Only fields present in the
    /// request are written; everything else keeps its stored value.
    pub async fn update_location_settings(
        pool: &PgPool,
        user_id: &str,
        update: &LocationSettingsUpdate,
    ) -> Result<bool, sqlx::Error> {
        if update.is_empty() {
            return Ok(true);
        }

        let mut builder = QueryBuilder::new("UPDATE users SET updated_at = NOW()");

        if let Some(latitude) = update.latitude {
            builder.push(", latitude = ").push_bind(latitude);
        }
        if let Some(longitude) = update.longitude {
            builder.push(", longitude = ").push_bind(longitude);
        }
        if let Some(ref location) = update.location {
            builder.push(", location = ").push_bind(location);
        }
        if let Some(radius) = update.notification_radius {
            builder.push(", notification_radius = ").push_bind(radius);
        }
        if let Some(enabled) = update.notifications_enabled {
            builder.push(", notifications_enabled = ").push_bind(enabled);
        }

        builder.push(" WHERE user_id = ").push_bind(user_id);

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
