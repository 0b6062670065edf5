// ABOUTME: End-to-end lifecycle test across registration, booking, confirmation, and review
// ABOUTME: Walks the canonical user/admin scenario through all four services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};

use bookit::errors::ErrorCode;
use bookit::models::{BookingStatus, UserRole};
use bookit::routes::auth::{LoginRequest, RegisterRequest};
use bookit::routes::bookings::{CreateBookingRequest, UpdateBookingRequest};
use bookit::routes::reviews::CreateReviewRequest;
use bookit::routes::services::CreateServiceRequest;

#[tokio::test]
async fn test_full_booking_lifecycle() {
    let resources = common::create_test_resources().await.unwrap();

    // User A registers and signs in
    resources
        .auth_service
        .register(RegisterRequest {
            full_name: "Alice Example".into(),
            email: "alice@example.com".into(),
            password: "a-strong-password".into(),
            role: UserRole::User,
        })
        .await
        .unwrap();
    let alice = resources
        .auth_service
        .login(LoginRequest {
            email: "alice@example.com".into(),
            password: "a-strong-password".into(),
        })
        .await
        .unwrap();
    let alice_header = common::bearer(&alice.access_token);

    // Admin registers and signs in
    resources
        .auth_service
        .register(RegisterRequest {
            full_name: "Robert Admin".into(),
            email: "admin@example.com".into(),
            password: "another-password".into(),
            role: UserRole::Admin,
        })
        .await
        .unwrap();
    let admin = resources
        .auth_service
        .login(LoginRequest {
            email: "admin@example.com".into(),
            password: "another-password".into(),
        })
        .await
        .unwrap();
    let admin_header = common::bearer(&admin.access_token);

    // Admin publishes an active service S
    let service = resources
        .catalog_service
        .create(
            Some(&admin_header),
            CreateServiceRequest {
                title: "Studio Session".into(),
                description: "One hour in the studio".into(),
                price_cents: 12_000,
                duration_mins: 60,
            },
        )
        .await
        .unwrap();

    // Alice books S for now+1h .. now+2h -> pending
    let start_time = Utc::now() + Duration::hours(1);
    let end_time = Utc::now() + Duration::hours(2);
    let booking = resources
        .booking_service
        .create(
            Some(&alice_header),
            CreateBookingRequest {
                service_id: service.id,
                start_time,
                end_time,
                status: BookingStatus::Pending,
            },
        )
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    // Admin confirms the booking; Alice sees the new status
    resources
        .booking_service
        .update(
            Some(&admin_header),
            booking.id,
            UpdateBookingRequest {
                update_status_to: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let seen = resources
        .booking_service
        .get_by_id(Some(&alice_header), booking.id)
        .await
        .unwrap();
    assert_eq!(seen.status, BookingStatus::Confirmed);

    // A second booking against S conflicts while the first is confirmed
    let err = resources
        .booking_service
        .create(
            Some(&alice_header),
            CreateBookingRequest {
                service_id: service.id,
                start_time: end_time + Duration::hours(1),
                end_time: end_time + Duration::hours(2),
                status: BookingStatus::Pending,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);

    // Reviews are rejected until the booking completes
    let err = resources
        .review_service
        .create(
            Some(&alice_header),
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // Admin marks the booking completed
    resources
        .booking_service
        .update(
            Some(&admin_header),
            booking.id,
            UpdateBookingRequest {
                update_status_to: Some(BookingStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Alice reviews with rating 5
    let review = resources
        .review_service
        .create(
            Some(&alice_header),
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 5,
                comment: Some("flawless".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(review.rating, 5);

    // A second review of the same booking conflicts
    let err = resources
        .review_service
        .create(
            Some(&alice_header),
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 4,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    // The review shows up on the service's review listing
    let reviews = resources
        .review_service
        .list_for_service(Some(&alice_header), service.id)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id, review.id);

    // The completed booking no longer blocks the service
    assert!(resources
        .booking_service
        .create(
            Some(&alice_header),
            CreateBookingRequest {
                service_id: service.id,
                start_time: end_time + Duration::hours(1),
                end_time: end_time + Duration::hours(2),
                status: BookingStatus::Pending,
            },
        )
        .await
        .is_ok());
}
