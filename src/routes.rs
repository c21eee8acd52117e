use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;
use crate::users::handlers as user_handlers;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
/// `allowed_origins` is a comma-separated origin list, or "*" for any.
pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    // Rate limiting: 5 registrations per minute per IP
    // Uses PeerIpKeyExtractor which reads from ConnectInfo<SocketAddr>
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(12) // 1 token every 12 seconds = 5 per minute
            .burst_size(5) // Allow burst of 5
            .finish()
            .expect("Failed to build governor config"),
    );
    let governor_limiter = governor_config.limiter().clone();

    // Spawn background task to clean up rate limiter state
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            governor_limiter.retain_recent();
        }
    });

    let register_routes = Router::new()
        .route(
            "/api/register",
            axum::routing::post(user_handlers::register),
        )
        .layer(GovernorLayer {
            config: governor_config,
        });

    let read_routes = Router::new()
        .route("/api/users", axum::routing::get(user_handlers::list_users))
        .route(
            "/api/users/{email}",
            axum::routing::get(user_handlers::get_user_by_email),
        );

    // WebSocket endpoint for the live-presence channel
    let ws_routes = Router::new().route("/ws", axum::routing::get(ws_handler::ws_upgrade));

    // Probes: "/" returns a fixed liveness string, /health the operational check
    let probes = Router::new()
        .route("/", axum::routing::get(liveness))
        .route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(register_routes)
        .merge(read_routes)
        .merge(ws_routes)
        .merge(probes)
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Browser clients are served from other origins; the allow-list comes from
/// configuration.
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// GET / — fixed confirmation string for liveness probing.
async fn liveness() -> &'static str {
    "User registry API is running"
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
