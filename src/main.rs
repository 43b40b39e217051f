use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use backend::{
    AppState,
    config::Config,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'ridetour_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    let state = AppState {
        pool,
        config: config.clone(),
    };

    let rate_limiter = Arc::new(RateLimiter::new(redis_client, config.clone()));

    // Public routes: auth plus the read-only feeds.
    let public_routes = Router::new()
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
        .route("/tours/list", get(routes::tour::list_tours))
        .route("/tours/detail", get(routes::tour::get_tour_detail))
        .route("/photos/list", get(routes::photo::list_photos))
        .route("/photos/by-user", get(routes::photo::user_photos))
        .route("/stats", get(routes::stats::get_stats));

    let protected_routes = Router::new()
        // User routes
        .route("/users/me", get(routes::user::get_me))
        .route(
            "/users/location-settings",
            put(routes::user::update_location_settings),
        )
        // Tour routes
        .route("/tours/create", post(routes::tour::create_tour))
        .route("/tours/mine", get(routes::tour::my_tours))
        .route("/tours/join", post(routes::tour::join_tour))
        .route("/tours/leave", post(routes::tour::leave_tour))
        .route("/tours/close", post(routes::tour::close_tour))
        .route("/tours/review", post(routes::tour::create_review))
        // Photo routes
        .route("/photos/create", post(routes::photo::create_photo))
        .route("/photos/like", post(routes::photo::like_photo))
        .route("/photos/unlike", post(routes::photo::unlike_photo))
        // Notification routes
        .route(
            "/notifications/list",
            get(routes::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(routes::notification::unread_count),
        )
        .route(
            "/notifications/mark-read",
            post(routes::notification::mark_read),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().nest(
        &config.api_base_uri.clone(),
        Router::new().merge(public_routes).merge(protected_routes),
    );

    let router = router.layer(axum::middleware::from_fn(log_errors)).layer(
        axum::middleware::from_fn_with_state(rate_limiter, rate_limit),
    );

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        let cors = CorsLayer::permissive();
        router.layer(cors)
    };

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
