// ABOUTME: Booking lifecycle route handlers: create, list, fetch, update, delete
// ABOUTME: Role-scoped operations consulting the central booking transition table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! Booking engine routes
//!
//! The booking lifecycle state machine lives here. Every operation resolves
//! identity first, then applies the role-scoped rules from the transition
//! table in [`crate::models::BookingStatus`]. Creation serializes exclusive
//! use of a service: the availability check and the insert run inside one
//! transaction, re-validated immediately before the insert, so at most one
//! booking per service is ever in `pending`/`confirmed`.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::{BookingFilter, Database};
use crate::errors::{AppError, AppResult};
use crate::middleware::{AuthMiddleware, AuthResult};
use crate::models::{Booking, BookingAction, BookingStatus, TokenKind, UserRole};
use crate::routes::auth::MessageResponse;
use crate::server::{bearer_header, ServerResources};

/// Booking creation request; the owner is the authenticated subject
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Initial status, normally `pending`
    #[serde(default)]
    pub status: BookingStatus,
}

/// Booking representation returned by every booking endpoint
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    fn from_booking(booking: Booking, message: Option<String>) -> Self {
        Self {
            message,
            id: booking.id,
            user_id: booking.user_id,
            service_id: booking.service_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Admin-only listing filters; all optional, combined with AND
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
    /// Start-time lower bound (inclusive)
    pub from: Option<DateTime<Utc>>,
    /// End-time upper bound (inclusive)
    pub to: Option<DateTime<Utc>>,
}

/// User-initiated booking update action
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateBookingAction {
    Reschedule,
    Cancel,
}

/// Booking update request
///
/// Users supply `action` (plus the new window when rescheduling); admins
/// supply `update_status_to`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingRequest {
    pub action: Option<UpdateBookingAction>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub update_status_to: Option<BookingStatus>,
}

/// Booking engine service
#[derive(Clone)]
pub struct BookingService {
    database: Arc<Database>,
    middleware: AuthMiddleware,
}

impl BookingService {
    #[must_use]
    pub const fn new(database: Arc<Database>, middleware: AuthMiddleware) -> Self {
        Self {
            database,
            middleware,
        }
    }

    /// Create a booking for an available service
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed time window, `ResourceNotFound`
    /// for an unknown service, and `ServiceUnavailable` while another booking
    /// occupies the service's active slot
    pub async fn create(
        &self,
        auth_header: Option<&str>,
        request: CreateBookingRequest,
    ) -> AppResult<BookingResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;
        AuthMiddleware::require_role(&auth, UserRole::User)?;

        let now = Utc::now();
        validate_window(request.start_time, request.end_time, now)?;

        let service = self
            .database
            .get_service(request.service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        if !service.is_active {
            return Err(AppError::service_unavailable(
                "requested service is not active",
            ));
        }

        // Lazy expiry sweep: reconcile a lapsed active booking before judging
        // availability. Deliberately its own commit boundary.
        self.sweep_lapsed_booking(request.service_id, now).await?;

        // Availability check and insert share one transaction; the check is
        // re-validated here, immediately before the insert
        let mut tx = self.database.begin().await?;
        if let Some(last) = self
            .database
            .latest_booking_for_service(&mut tx, request.service_id)
            .await?
        {
            if last.status.is_active() {
                return Err(AppError::service_unavailable(
                    "requested service not available",
                ));
            }
        }

        let booking = Booking::new(
            auth.user_id,
            request.service_id,
            request.start_time,
            request.end_time,
            request.status,
        );
        self.database.insert_booking(&mut tx, &booking).await?;
        tx.commit().await?;

        tracing::info!(
            "Booking {} created for service {} by user {}",
            booking.id,
            booking.service_id,
            booking.user_id
        );

        Ok(BookingResponse::from_booking(
            booking,
            Some("booking created".into()),
        ))
    }

    /// Reconcile the service's most recent booking if its window has lapsed:
    /// pending becomes cancelled, confirmed becomes completed
    async fn sweep_lapsed_booking(
        &self,
        service_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tx = self.database.begin().await?;

        let Some(last) = self
            .database
            .latest_booking_for_service(&mut tx, service_id)
            .await?
        else {
            return Ok(());
        };

        if last.end_time >= now {
            return Ok(());
        }

        let swept = match last.status {
            BookingStatus::Pending => last.status.next(BookingAction::Cancel),
            BookingStatus::Confirmed => last.status.next(BookingAction::Complete),
            BookingStatus::Cancelled | BookingStatus::Completed => None,
        };

        if let Some(next) = swept {
            self.database
                .set_booking_status(&mut tx, last.id, next)
                .await?;
            tx.commit().await?;
            tracing::info!(
                "Swept lapsed booking {}: {} -> {next}",
                last.id,
                last.status
            );
        }

        Ok(())
    }

    /// List bookings, role-scoped
    ///
    /// Users see only their own bookings; admins see all, optionally
    /// filtered. Both orderings are newest-first by creation time.
    ///
    /// # Errors
    ///
    /// Returns an error when authentication or persistence fails
    pub async fn list(
        &self,
        auth_header: Option<&str>,
        query: BookingListQuery,
    ) -> AppResult<Vec<BookingResponse>> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let bookings = match auth.role {
            UserRole::User => self.database.list_bookings_for_user(auth.user_id).await?,
            UserRole::Admin => {
                let filter = BookingFilter {
                    status: query.status,
                    from: query.from,
                    to: query.to,
                };
                self.database.list_bookings(&filter).await?
            }
        };

        Ok(bookings
            .into_iter()
            .map(|b| BookingResponse::from_booking(b, None))
            .collect())
    }

    /// Fetch one booking by id
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id and `PermissionDenied`
    /// when a user asks for a booking they do not own; the two are never
    /// conflated
    pub async fn get_by_id(
        &self,
        auth_header: Option<&str>,
        booking_id: Uuid,
    ) -> AppResult<BookingResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let booking = self
            .database
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking"))?;

        check_booking_access(&auth, &booking, "you can only view a booking you created")?;

        Ok(BookingResponse::from_booking(booking, None))
    }

    /// Update a booking: users reschedule or cancel their own pending or
    /// confirmed bookings; admins set any explicit target status
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` on ownership mismatch, `InvalidInput` when
    /// the transition table rejects the action or the new window is malformed
    pub async fn update(
        &self,
        auth_header: Option<&str>,
        booking_id: Uuid,
        request: UpdateBookingRequest,
    ) -> AppResult<MessageResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let booking = self
            .database
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking"))?;

        match auth.role {
            UserRole::Admin => {
                // Admins may force any status; the transition table does not
                // constrain them
                let target = request.update_status_to.ok_or_else(|| {
                    AppError::invalid_input("update_status_to cannot be null")
                })?;
                self.database
                    .update_booking_status(booking_id, target)
                    .await?;
                tracing::info!(
                    "Admin {} set booking {booking_id} status to {target}",
                    auth.user_id
                );
                Ok(MessageResponse {
                    message: "booking status updated".into(),
                })
            }
            UserRole::User => {
                if booking.user_id != auth.user_id {
                    return Err(AppError::forbidden(
                        "you can only update a booking you created",
                    ));
                }
                let action = request.action.ok_or_else(|| {
                    AppError::invalid_input("specify an action: reschedule or cancel")
                })?;
                match action {
                    UpdateBookingAction::Cancel => {
                        let next = booking
                            .status
                            .next(BookingAction::Cancel)
                            .ok_or_else(transition_rejected)?;
                        self.database.update_booking_status(booking_id, next).await?;
                        tracing::info!("Booking {booking_id} cancelled by its owner");
                        Ok(MessageResponse {
                            message: "booking cancelled".into(),
                        })
                    }
                    UpdateBookingAction::Reschedule => {
                        booking
                            .status
                            .next(BookingAction::Reschedule)
                            .ok_or_else(transition_rejected)?;
                        let (Some(start_time), Some(end_time)) =
                            (request.start_time, request.end_time)
                        else {
                            return Err(AppError::invalid_input(
                                "to reschedule, specify new start_time and end_time",
                            ));
                        };
                        validate_window(start_time, end_time, Utc::now())?;
                        self.database
                            .update_booking_window(booking_id, start_time, end_time)
                            .await?;
                        tracing::info!("Booking {booking_id} rescheduled by its owner");
                        Ok(MessageResponse {
                            message: "booking rescheduled".into(),
                        })
                    }
                }
            }
        }
    }

    /// Delete a booking: owners before it starts, admins anytime
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` on ownership mismatch and `InvalidInput`
    /// when the owner tries to delete a booking that already started
    pub async fn delete(
        &self,
        auth_header: Option<&str>,
        booking_id: Uuid,
    ) -> AppResult<MessageResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let booking = self
            .database
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking"))?;

        match auth.role {
            UserRole::Admin => {}
            UserRole::User => {
                if booking.user_id != auth.user_id {
                    return Err(AppError::forbidden(
                        "you can only delete a booking you created",
                    ));
                }
                if booking.start_time < Utc::now() {
                    return Err(AppError::invalid_input(
                        "you can only delete bookings that are yet to start",
                    ));
                }
            }
        }

        self.database.delete_booking(booking_id).await?;
        tracing::info!("Booking {booking_id} deleted by {}", auth.user_id);

        Ok(MessageResponse {
            message: format!("booking with id {booking_id} deleted"),
        })
    }
}

fn transition_rejected() -> AppError {
    AppError::invalid_input("booking status has to be pending or confirmed to perform action")
}

fn validate_window(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if end_time <= start_time {
        return Err(AppError::invalid_input("end_time must be after start_time"));
    }
    if start_time < now || end_time < now {
        return Err(AppError::invalid_input(
            "start_time and end_time must not be in the past",
        ));
    }
    Ok(())
}

fn check_booking_access(auth: &AuthResult, booking: &Booking, denial: &str) -> AppResult<()> {
    match auth.role {
        UserRole::Admin => Ok(()),
        UserRole::User => {
            if booking.user_id == auth.user_id {
                Ok(())
            } else {
                Err(AppError::forbidden(denial))
            }
        }
    }
}

/// Booking route handlers
pub struct BookingRoutes;

impl BookingRoutes {
    /// Create all booking routes
    pub fn router() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/bookings", get(list_handler).post(create_handler))
            .route(
                "/bookings/:id",
                get(get_handler).patch(update_handler).delete(delete_handler),
            )
    }
}

async fn create_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let response = resources
        .booking_service
        .create(bearer_header(&headers), request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let response = resources
        .booking_service
        .list(bearer_header(&headers), query)
        .await?;
    Ok(Json(response))
}

async fn get_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let response = resources
        .booking_service
        .get_by_id(bearer_header(&headers), id)
        .await?;
    Ok(Json(response))
}

async fn update_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = resources
        .booking_service
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
        .booking_service
        .delete(bearer_header(&headers), id)
        .await?;
    Ok(Json(response))
}
