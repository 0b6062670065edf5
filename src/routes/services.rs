// ABOUTME: Service catalog route handlers: admin-gated CRUD plus authenticated queries
// ABOUTME: Query filters are conjunctive: title substring, price range, active flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! Service catalog routes
//!
//! Create/update/delete require the admin role; reads require any
//! authenticated identity.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::{Database, ServiceFilter};
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthMiddleware;
use crate::models::{ServiceOffering, TokenKind, UserRole};
use crate::routes::auth::MessageResponse;
use crate::routes::reviews::ReviewResponse;
use crate::server::{bearer_header, ServerResources};

/// Service creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    pub description: String,
    /// Price in minor currency units (cents)
    pub price_cents: i64,
    pub duration_mins: i64,
}

/// Service representation returned by every catalog endpoint
#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_mins: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ServiceResponse {
    fn from_service(service: ServiceOffering, message: Option<String>) -> Self {
        Self {
            message,
            id: service.id,
            title: service.title,
            description: service.description,
            price_cents: service.price_cents,
            duration_mins: service.duration_mins,
            is_active: service.is_active,
            created_at: service.created_at,
        }
    }
}

/// Catalog query filters; all optional, combined with AND
#[derive(Debug, Default, Deserialize)]
pub struct ServiceListQuery {
    /// Case-insensitive substring match on the title
    pub q: Option<String>,
    pub price_min_cents: Option<i64>,
    pub price_max_cents: Option<i64>,
    pub active: Option<bool>,
}

/// Partial service update; unsupplied fields keep their prior values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_mins: Option<i64>,
    pub is_active: Option<bool>,
}

/// Catalog service for offering CRUD and queries
#[derive(Clone)]
pub struct CatalogService {
    database: Arc<Database>,
    middleware: AuthMiddleware,
}

impl CatalogService {
    #[must_use]
    pub const fn new(database: Arc<Database>, middleware: AuthMiddleware) -> Self {
        Self {
            database,
            middleware,
        }
    }

    /// Create a service offering (admin only)
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for non-admin callers and `InvalidInput`
    /// when price or duration violate their bounds
    pub async fn create(
        &self,
        auth_header: Option<&str>,
        request: CreateServiceRequest,
    ) -> AppResult<ServiceResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;
        AuthMiddleware::require_role(&auth, UserRole::Admin)?;

        validate_price_and_duration(request.price_cents, request.duration_mins)?;

        let service = ServiceOffering::new(
            request.title,
            Some(request.description),
            request.price_cents,
            request.duration_mins,
        );
        self.database.create_service(&service).await?;

        tracing::info!("Service {} created by admin {}", service.id, auth.user_id);

        Ok(ServiceResponse::from_service(
            service,
            Some("service created".into()),
        ))
    }

    /// Fetch one service offering by id
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id
    pub async fn get_by_id(
        &self,
        auth_header: Option<&str>,
        service_id: Uuid,
    ) -> AppResult<ServiceResponse> {
        self.middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let service = self
            .database
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;

        Ok(ServiceResponse::from_service(service, None))
    }

    /// List service offerings matching the query filters
    ///
    /// # Errors
    ///
    /// Returns an error when authentication or persistence fails
    pub async fn query(
        &self,
        auth_header: Option<&str>,
        query: ServiceListQuery,
    ) -> AppResult<Vec<ServiceResponse>> {
        self.middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let filter = ServiceFilter {
            title: query.q,
            price_min_cents: query.price_min_cents,
            price_max_cents: query.price_max_cents,
            is_active: query.active,
        };
        let services = self.database.list_services(&filter).await?;

        Ok(services
            .into_iter()
            .map(|s| ServiceResponse::from_service(s, None))
            .collect())
    }

    /// Apply a partial update to a service offering (admin only)
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for non-admin callers, `ResourceNotFound`
    /// for an unknown id, and `InvalidInput` on bound violations
    pub async fn update(
        &self,
        auth_header: Option<&str>,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> AppResult<ServiceResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;
        AuthMiddleware::require_role(&auth, UserRole::Admin)?;

        let mut service = self
            .database
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;

        if let Some(title) = request.title {
            service.title = title;
        }
        if let Some(description) = request.description {
            service.description = Some(description);
        }
        if let Some(price_cents) = request.price_cents {
            service.price_cents = price_cents;
        }
        if let Some(duration_mins) = request.duration_mins {
            service.duration_mins = duration_mins;
        }
        if let Some(is_active) = request.is_active {
            service.is_active = is_active;
        }
        validate_price_and_duration(service.price_cents, service.duration_mins)?;

        self.database.update_service(&service).await?;

        tracing::info!("Service {service_id} updated by admin {}", auth.user_id);

        Ok(ServiceResponse::from_service(
            service,
            Some("update successful".into()),
        ))
    }

    /// Delete a service offering (admin only)
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for non-admin callers and
    /// `ResourceNotFound` when nothing was deleted
    pub async fn delete(
        &self,
        auth_header: Option<&str>,
        service_id: Uuid,
    ) -> AppResult<MessageResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;
        AuthMiddleware::require_role(&auth, UserRole::Admin)?;

        let removed = self.database.delete_service(service_id).await?;
        if removed == 0 {
            return Err(AppError::not_found("Service"));
        }

        tracing::info!("Service {service_id} deleted by admin {}", auth.user_id);

        Ok(MessageResponse {
            message: "service deleted".into(),
        })
    }
}

fn validate_price_and_duration(price_cents: i64, duration_mins: i64) -> AppResult<()> {
    if price_cents < 0 {
        return Err(AppError::invalid_input("price must not be negative"));
    }
    if duration_mins <= 0 {
        return Err(AppError::invalid_input("duration must be positive"));
    }
    Ok(())
}

/// Catalog route handlers
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all catalog routes
    pub fn router() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/services", get(query_handler).post(create_handler))
            .route(
                "/services/:id",
                get(get_handler).patch(update_handler).delete(delete_handler),
            )
            .route("/services/:id/reviews", get(service_reviews_handler))
    }
}

async fn create_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), AppError> {
    let response = resources
        .catalog_service
        .create(bearer_header(&headers), request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn query_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let response = resources
        .catalog_service
        .query(bearer_header(&headers), query)
        .await?;
    Ok(Json(response))
}

async fn get_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceResponse>, AppError> {
    let response = resources
        .catalog_service
        .get_by_id(bearer_header(&headers), id)
        .await?;
    Ok(Json(response))
}

async fn update_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError> {
    let response = resources
        .catalog_service
        .update(bearer_header(&headers), id, request)
        .await?;
    Ok(Json(response))
}

async fn delete_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = resources
        .catalog_service
        .delete(bearer_header(&headers), id)
        .await?;
    Ok(Json(response))
}

async fn service_reviews_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let response = resources
        .review_service
        .list_for_service(bearer_header(&headers), id)
        .await?;
    Ok(Json(response))
}
