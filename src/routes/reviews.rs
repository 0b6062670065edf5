// ABOUTME: Review route handlers: post-completion feedback tied 1:1 to bookings
// ABOUTME: Creation requires a completed booking owned by the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! Review routes
//!
//! A review may exist only for a booking the caller owns and only once that
//! booking is `completed`; each booking carries at most one review.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthMiddleware;
use crate::models::{BookingStatus, Review, TokenKind, UserRole, MAX_RATING, MIN_RATING};
use crate::routes::auth::MessageResponse;
use crate::server::{bearer_header, ServerResources};

/// Review creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Review representation returned by every review endpoint
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            booking_id: review.booking_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

/// Review update request; comment omission preserves the prior value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// Review service
#[derive(Clone)]
pub struct ReviewService {
    database: Arc<Database>,
    middleware: AuthMiddleware,
}

impl ReviewService {
    #[must_use]
    pub const fn new(database: Arc<Database>, middleware: AuthMiddleware) -> Self {
        Self {
            database,
            middleware,
        }
    }

    /// Create a review for a completed booking the caller owns
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the caller has no such booking,
    /// `InvalidInput` when the booking is not completed or the rating is out
    /// of range, and `ResourceAlreadyExists` when the booking already has a
    /// review
    pub async fn create(
        &self,
        auth_header: Option<&str>,
        request: CreateReviewRequest,
    ) -> AppResult<ReviewResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;
        AuthMiddleware::require_role(&auth, UserRole::User)?;

        validate_rating(request.rating)?;

        let booking = self
            .database
            .get_booking(request.booking_id)
            .await?
            .filter(|b| b.user_id == auth.user_id)
            .ok_or_else(|| AppError::not_found("Booking"))?;

        if booking.status != BookingStatus::Completed {
            return Err(AppError::invalid_input(
                "booking must be completed before you can make a review",
            ));
        }

        // Duplicate check and insert share one transaction; the unique
        // booking_id column backstops a racing second review
        let mut tx = self.database.begin().await?;
        if self
            .database
            .get_review_for_booking(&mut tx, booking.id)
            .await?
            .is_some()
        {
            return Err(AppError::already_exists("booking review already exists"));
        }

        let review = Review::new(booking.id, request.rating, request.comment);
        self.database.insert_review(&mut tx, &review).await?;
        tx.commit().await?;

        tracing::info!(
            "Review {} created for booking {} by user {}",
            review.id,
            booking.id,
            auth.user_id
        );

        Ok(ReviewResponse::from(review))
    }

    /// List all reviews for a service, joining through its bookings
    ///
    /// A service with zero reviews yields `ResourceNotFound`, matching the
    /// established API behavior.
    ///
    /// # Errors
    ///
    /// Returns an error when authentication or persistence fails
    pub async fn list_for_service(
        &self,
        auth_header: Option<&str>,
        service_id: Uuid,
    ) -> AppResult<Vec<ReviewResponse>> {
        self.middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let reviews = self.database.list_reviews_for_service(service_id).await?;
        if reviews.is_empty() {
            return Err(AppError::not_found("Review"));
        }

        Ok(reviews.into_iter().map(ReviewResponse::from).collect())
    }

    /// Update a review; only the owning booking's user may edit
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown review, `PermissionDenied`
    /// when the caller does not own the underlying booking, and
    /// `InvalidInput` for an out-of-range rating
    pub async fn update(
        &self,
        auth_header: Option<&str>,
        review_id: Uuid,
        request: UpdateReviewRequest,
    ) -> AppResult<ReviewResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        validate_rating(request.rating)?;

        let (mut review, owner_id) = self
            .database
            .get_review_with_owner(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("Review"))?;

        if owner_id != auth.user_id {
            return Err(AppError::forbidden("you're not allowed to edit this review"));
        }

        review.rating = request.rating;
        if let Some(comment) = request.comment {
            review.comment = Some(comment);
        }
        self.database
            .update_review(review.id, review.rating, review.comment.as_deref())
            .await?;

        tracing::info!("Review {review_id} updated by user {}", auth.user_id);

        Ok(ReviewResponse::from(review))
    }

    /// Delete a review
    ///
    /// Any authenticated identity may delete: the gate is presence of a
    /// valid role, not ownership, matching the established API behavior.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when nothing was deleted
    pub async fn delete(
        &self,
        auth_header: Option<&str>,
        review_id: Uuid,
    ) -> AppResult<MessageResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        match auth.role {
            UserRole::User | UserRole::Admin => {}
        }

        let removed = self.database.delete_review(review_id).await?;
        if removed == 0 {
            return Err(AppError::not_found("Review"));
        }

        tracing::info!("Review {review_id} deleted by {}", auth.user_id);

        Ok(MessageResponse {
            message: "review deleted".into(),
        })
    }
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::invalid_input(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Review route handlers
pub struct ReviewRoutes;

impl ReviewRoutes {
    /// Create all review routes
    pub fn router() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/reviews", post(create_handler))
            .route(
                "/reviews/:id",
                axum::routing::patch(update_handler).delete(delete_handler),
            )
    }
}

async fn create_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let response = resources
        .review_service
        .create(bearer_header(&headers), request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let response = resources
        .review_service
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
        .review_service
        .delete(bearer_header(&headers), id)
        .await?;
    Ok(Json(response))
}
