mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("initializing Swachh SDK");
    let sdk = swachh_sdk::AsyncSwachhSdk::builder()
        .from_env()
        .build()
        .await
        .expect("Failed to initialize Swachh SDK");

    let export_dir = std::env::temp_dir().join("swachh-exports");
    let state = Arc::new(AppState { sdk, export_dir });

    let app = Router::new()
        .route("/api/login", post(routes::users::login))
        .route("/api/users/{id}/balance", get(routes::users::balance))
        .route(
            "/api/users/{id}/notifications",
            get(routes::notifications::list_unread),
        )
        .route(
            "/api/notifications/{id}/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/api/reports",
            get(routes::reports::list_reports).post(routes::reports::create_report),
        )
        .route("/api/verify", post(routes::reports::verify))
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        .route("/api/dashboard/export", get(routes::dashboard::export))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:3000";
    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
