// ABOUTME: Server resources and HTTP serving: router assembly, layers, graceful shutdown
// ABOUTME: All service objects are constructed once here and injected by reference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # Server wiring
//!
//! [`ServerResources`] is the process-wide dependency container: the database
//! pool, the credential codec, and the four domain services, constructed once
//! at startup and shared behind an `Arc`. No global singletons.

use axum::http::{header, HeaderMap};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::middleware::AuthMiddleware;
use crate::routes::auth::AuthRoutes;
use crate::routes::bookings::BookingRoutes;
use crate::routes::health::HealthRoutes;
use crate::routes::reviews::ReviewRoutes;
use crate::routes::services::ServiceRoutes;
use crate::routes::{AuthService, BookingService, CatalogService, ReviewService};

/// Extract the raw `Authorization` header value from a request
#[must_use]
pub fn bearer_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Process-wide dependency container shared by all route handlers
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub booking_service: BookingService,
    pub review_service: ReviewService,
}

impl ServerResources {
    /// Construct every service object from the shared database and codec
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(auth_manager);
        let middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());

        Self {
            auth_service: AuthService::new(database.clone(), auth_manager.clone()),
            catalog_service: CatalogService::new(database.clone(), middleware.clone()),
            booking_service: BookingService::new(database.clone(), middleware.clone()),
            review_service: ReviewService::new(database.clone(), middleware),
            database,
            auth_manager,
        }
    }
}

/// Assemble the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::router())
        .merge(AuthRoutes::router())
        .merge(ServiceRoutes::router())
        .merge(BookingRoutes::router())
        .merge(ReviewRoutes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(resources)
}

/// Bind and serve until shutdown is requested
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn serve(config: &ServerConfig, resources: Arc<ServerResources>) -> AppResult<()> {
    let app = router(resources);
    let address = format!("{}:{}", config.http_host, config.http_port);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| crate::errors::AppError::internal(format!("failed to bind {address}: {e}")))?;

    tracing::info!("BookIt API listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::errors::AppError::internal(format!("server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
