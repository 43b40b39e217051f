use sqlx::{FromRow, PgPool};

use crate::routes::tour::Tour;
use crate::utils::calculate_distance;

use super::model::{KIND_NEARBY_TOUR, NewNotification, Notification};

/// Fallback when a user row predates the `notification_radius` column
/// default. Must stay in sync with the column default in the schema.
const DEFAULT_NOTIFICATION_RADIUS_KM: i32 = 50;

const NEARBY_TOUR_TITLE: &str = "New Ride Near You!";

/// Location-relevant slice of a user row, as loaded for one selection
/// pass.
#[derive(Debug, FromRow)]
pub struct NotifiableUser {
    pub user_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notification_radius: Option<i32>,
    pub notifications_enabled: bool,
}

/// A user selected for a nearby-tour notification, with the distance
/// captured at selection time.
#[derive(Debug, PartialEq)]
pub struct Candidate {
    pub user_id: String,
    pub distance_km: f64,
}

/// Scores every candidate against the tour start and keeps those within
/// their own effective radius. Pure selection; persistence happens in
/// `materialize`.
///
/// The creator is never selected, users without both coordinates or with
/// notifications disabled are skipped, and the radius boundary is
/// inclusive.
pub fn select_candidates(tour: &Tour, users: &[NotifiableUser]) -> Vec<Candidate> {
    let (Some(tour_lat), Some(tour_lon)) = (tour.start_latitude, tour.start_longitude) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();

    for user in users {
        if user.user_id == tour.created_by_id {
            continue;
        }
        if !user.notifications_enabled {
            continue;
        }
        let (Some(lat), Some(lon)) = (user.latitude, user.longitude) else {
            continue;
        };

        let distance_km = calculate_distance(tour_lat, tour_lon, lat, lon);
        let effective_radius = user
            .notification_radius
            .unwrap_or(DEFAULT_NOTIFICATION_RADIUS_KM) as f64;

        if distance_km <= effective_radius {
            candidates.push(Candidate {
                user_id: user.user_id.clone(),
                distance_km,
            });
        }
    }

    candidates
}

/// Message shown in the notification list. The distance is rounded for
/// display only; the stored value keeps full precision.
fn render_message(tour: &Tour, distance_km: f64) -> String {
    format!(
        "\"{}\" starts {}km from your location on {}",
        tour.title,
        distance_km.round() as i64,
        tour.start_date.format("%Y-%m-%d")
    )
}

/// Converts selected candidates into persisted notification rows. One
/// atomic multi-row insert per tour-creation event; an empty candidate
/// set writes nothing.
async fn materialize(
    pool: &PgPool,
    tour: &Tour,
    candidates: &[Candidate],
) -> Result<u64, sqlx::Error> {
    let rows: Vec<NewNotification> = candidates
        .iter()
        .map(|candidate| NewNotification {
            user_id: candidate.user_id.clone(),
            tour_id: tour.tour_id.clone(),
            kind: KIND_NEARBY_TOUR.to_string(),
            title: NEARBY_TOUR_TITLE.to_string(),
            message: render_message(tour, candidate.distance_km),
            distance_km: candidate.distance_km,
        })
        .collect();

    Notification::create_batch(pool, &rows).await
}

async fn run_notification_pass(pool: &PgPool, tour_id: &str) -> Result<u64, sqlx::Error> {
    let Some(tour) = Tour::find_by_id(pool, tour_id).await? else {
        tracing::info!("Tour {} not found, skipping notification pass", tour_id);
        return Ok(0);
    };

    if tour.start_latitude.is_none() || tour.start_longitude.is_none() {
        tracing::info!(
            "Tour {} has no start coordinates, skipping notification pass",
            tour_id
        );
        return Ok(0);
    }

    // Full eligible pool; no geographic pre-filtering before the exact
    // distance check.
    let users = sqlx::query_as::<_, NotifiableUser>(
        r#"
        SELECT user_id, latitude, longitude, notification_radius, notifications_enabled
        FROM users
        WHERE notifications_enabled = true
          AND latitude IS NOT NULL
          AND longitude IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    let candidates = select_candidates(&tour, &users);
    materialize(pool, &tour, &candidates).await
}

/// Entry point for the proximity pass, dispatched after a tour insert
/// commits. Never surfaces a failure to the caller; the outcome is log
/// output only.
pub async fn notify_nearby_users(pool: &PgPool, tour_id: &str) {
    match run_notification_pass(pool, tour_id).await {
        Ok(0) => {}
        Ok(count) => {
            tracing::info!(
                "Created {} nearby tour notifications for tour {}",
                count,
                tour_id
            );
        }
        Err(e) => {
            tracing::error!("Nearby tour notification pass failed for {}: {:?}", tour_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    // Monterey Bay tour start; Salinas is ~30 km away, San Francisco
    // ~142 km.
    const TOUR_LAT: f64 = 36.6002;
    const TOUR_LON: f64 = -121.8947;
    const SALINAS: (f64, f64) = (36.3283, -121.8863);
    const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);

    fn tour() -> Tour {
        Tour {
            tour_id: "tour-1".to_string(),
            title: "Coastal Loop".to_string(),
            description: None,
            start_location: "Monterey Bay".to_string(),
            end_location: "Big Sur".to_string(),
            start_latitude: Some(TOUR_LAT),
            start_longitude: Some(TOUR_LON),
            end_latitude: None,
            end_longitude: None,
            start_date: Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap(),
            max_participants: 10,
            difficulty: "moderate".to_string(),
            distance_miles: Some(120),
            image_url: None,
            created_by_id: "creator".to_string(),
            is_active: true,
            is_closed: false,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    fn user(id: &str, coords: Option<(f64, f64)>, radius: Option<i32>) -> NotifiableUser {
        NotifiableUser {
            user_id: id.to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            notification_radius: radius,
            notifications_enabled: true,
        }
    }

    #[test]
    fn user_within_radius_is_selected() {
        let candidates = select_candidates(&tour(), &[user("x", Some(SALINAS), Some(50))]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].user_id, "x");
        assert!((candidates[0].distance_km - 30.2).abs() < 0.5);
    }

    #[test]
    fn user_outside_radius_is_not_selected() {
        let candidates = select_candidates(&tour(), &[user("y", Some(SAN_FRANCISCO), Some(50))]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn raising_radius_selects_distant_user_with_true_distance() {
        let candidates = select_candidates(&tour(), &[user("y", Some(SAN_FRANCISCO), Some(150))]);
        assert_eq!(candidates.len(), 1);
        // Stored distance reflects geography, not the radius setting.
        assert!((candidates[0].distance_km - 142.0).abs() < 3.0);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let distance = calculate_distance(TOUR_LAT, TOUR_LON, SALINAS.0, SALINAS.1);
        let exact = distance.ceil() as i32;
        // A radius at or beyond the distance selects; one inside does not.
        assert_eq!(
            select_candidates(&tour(), &[user("x", Some(SALINAS), Some(exact))]).len(),
            1
        );
        assert!(select_candidates(&tour(), &[user("x", Some(SALINAS), Some(exact - 1))])
            .is_empty());

        // Exact equality: distance 0 against radius 0 still selects.
        let at_start = user("x", Some((TOUR_LAT, TOUR_LON)), Some(0));
        assert_eq!(select_candidates(&tour(), &[at_start]).len(), 1);
    }

    #[test]
    fn creator_is_never_selected() {
        // Creator sits right at the tour start, well inside any radius.
        let candidates = select_candidates(
            &tour(),
            &[user("creator", Some((TOUR_LAT, TOUR_LON)), Some(50))],
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn disabled_user_is_never_selected() {
        let mut u = user("x", Some(SALINAS), Some(50));
        u.notifications_enabled = false;
        assert!(select_candidates(&tour(), &[u]).is_empty());
    }

    #[test]
    fn user_without_coordinates_is_skipped() {
        assert!(select_candidates(&tour(), &[user("x", None, Some(50))]).is_empty());
    }

    #[test]
    fn missing_radius_falls_back_to_default() {
        // Salinas is inside the 50 km default.
        let candidates = select_candidates(&tour(), &[user("x", Some(SALINAS), None)]);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn tour_without_coordinates_selects_nobody() {
        let mut t = tour();
        t.start_latitude = None;
        t.start_longitude = None;
        assert!(select_candidates(&t, &[user("x", Some(SALINAS), Some(200))]).is_empty());
    }

    #[test]
    fn message_rounds_distance_and_keeps_title() {
        let msg = render_message(&tour(), 30.2012);
        assert_eq!(
            msg,
            "\"Coastal Loop\" starts 30km from your location on 2025-06-14"
        );
    }
}
