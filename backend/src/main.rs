//! Main entry point for the CodeGuardian backend.
//!
//! This file initializes the Axum web server, seeds the in-memory user
//! store, and registers all API routes and middleware.
//! It orchestrates the application's startup and defines its overall structure.

mod api;
mod auth;
mod classifier;
mod config;
mod errors;
mod services;
mod store;
mod utils;

use crate::api::common::ApiResponse;
use crate::store::{MemoryStore, SharedStore};
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let store: SharedStore = Arc::new(MemoryStore::seeded().unwrap());

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/auth", auth::routes::auth_router())
        .nest("/api", api::scan::routes::scan_router())
        .nest("/api/admin", api::admin::routes::admin_router())
        .nest("/api/dashboard", api::dashboard::routes::dashboard_router())
        .layer(Extension(store))
        .layer(Extension(config.clone()));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting CodeGuardian server on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "CodeGuardian Backend",
            "version": "0.1.0"
        }),
        "Welcome to the CodeGuardian API",
    ))
}
