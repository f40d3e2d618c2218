pub mod db;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use rota_core::store::RotaStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(store: Arc<dyn RotaStore>) -> Router {
    let app_state = state::AppState::new(store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        // Teams
        .route("/api/teams", post(routes::teams::create_team))
        .route("/api/teams/{name}", get(routes::teams::get_team))
        .route(
            "/api/teams/{name}/deactivate",
            post(routes::teams::deactivate_members),
        )
        // Users
        .route("/api/users/{id}/active", post(routes::users::set_active))
        .route("/api/users/{id}/reviews", get(routes::users::get_reviews))
        // Pull requests
        .route("/api/pulls", post(routes::pulls::create_pull))
        .route("/api/pulls/{id}/merge", post(routes::pulls::merge_pull))
        .route(
            "/api/pulls/{id}/reassign",
            post(routes::pulls::reassign_pull),
        )
        // Stats
        .route("/api/stats", get(routes::stats::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the server on `0.0.0.0:port`.
pub async fn serve(store: Arc<dyn RotaStore>, port: u16) -> anyhow::Result<()> {
    let app = build_router(store);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("rota listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
