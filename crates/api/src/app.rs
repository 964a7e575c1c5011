use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{events, health, invitations, matching, profiles, users};
use crate::services::MatchingService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub matching: MatchingService,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let matching = MatchingService::new(pool.clone(), &config.matching);

    let state = AppState {
        pool,
        config: config.clone(),
        matching,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        // Users and profiles (v1)
        .route("/api/v1/users", post(users::create_user))
        .route(
            "/api/v1/users/:username/events",
            get(events::get_events_for_user),
        )
        .route(
            "/api/v1/profiles/:username",
            get(profiles::get_profile).put(profiles::update_profile),
        )
        .route(
            "/api/v1/profiles/:username/auto-invite",
            put(profiles::set_auto_invite),
        )
        // Events (v1)
        .route("/api/v1/events", post(events::create_event))
        .route(
            "/api/v1/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        // Invitations (v1)
        .route(
            "/api/v1/events/:event_id/invitations",
            post(invitations::invite_user),
        )
        .route(
            "/api/v1/events/:event_id/invitations/respond",
            post(invitations::respond_to_invitation),
        )
        // Matching triggers (v1)
        .route(
            "/api/v1/matching/events/:event_id",
            post(matching::run_for_event).get(matching::list_for_event),
        )
        .route(
            "/api/v1/matching/events/:event_id/rebuild",
            post(matching::rebuild_for_event),
        )
        .route(
            "/api/v1/matching/users/:username",
            post(matching::run_for_user).get(matching::list_for_user),
        )
        .route("/api/v1/matching/run", post(matching::run_all))
        .route("/api/v1/matching/rebuild", post(matching::rebuild_all));

    Router::new()
        .merge(api_routes)
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
