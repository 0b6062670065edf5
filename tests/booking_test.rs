// ABOUTME: Integration tests for the booking lifecycle engine
// ABOUTME: Covers creation, availability, the lazy sweep, role-scoped updates, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use bookit::errors::ErrorCode;
use bookit::models::{BookingStatus, UserRole};
use bookit::routes::bookings::{
    BookingListQuery, CreateBookingRequest, UpdateBookingAction, UpdateBookingRequest,
};

fn create_request(service_id: Uuid) -> CreateBookingRequest {
    let (start_time, end_time) = common::future_window();
    CreateBookingRequest {
        service_id,
        start_time,
        end_time,
        status: BookingStatus::Pending,
    }
}

#[tokio::test]
async fn test_create_and_get_round_trip() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, header) =
        common::create_test_user(&resources, "owner@example.com", UserRole::User)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let request = create_request(service.id);
    let created = resources
        .booking_service
        .create(Some(&header), request.clone())
        .await
        .unwrap();

    assert_eq!(created.user_id, user_id);
    assert_eq!(created.service_id, service.id);
    assert_eq!(created.status, BookingStatus::Pending);

    let fetched = resources
        .booking_service
        .get_by_id(Some(&header), created.id)
        .await
        .unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.user_id, user_id);
    assert_eq!(fetched.service_id, service.id);
    assert_eq!(fetched.start_time, request.start_time);
    assert_eq!(fetched.end_time, request.end_time);
    assert_eq!(fetched.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_create_rejects_malformed_windows_without_mutation() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, header) =
        common::create_test_user(&resources, "window@example.com", UserRole::User)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    // end before start
    let mut inverted = create_request(service.id);
    std::mem::swap(&mut inverted.start_time, &mut inverted.end_time);
    let err = resources
        .booking_service
        .create(Some(&header), inverted)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // window in the past
    let mut past = create_request(service.id);
    past.start_time = Utc::now() - Duration::hours(2);
    past.end_time = Utc::now() - Duration::hours(1);
    let err = resources
        .booking_service
        .create(Some(&header), past)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // nothing was written
    let bookings = resources
        .database
        .list_bookings_for_user(user_id)
        .await
        .unwrap();
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn test_create_rejects_unknown_and_inactive_services() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header) = common::create_test_user(&resources, "svc@example.com", UserRole::User)
        .await
        .unwrap();

    let err = resources
        .booking_service
        .create(Some(&header), create_request(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let mut service = common::create_test_service(&resources).await.unwrap();
    service.is_active = false;
    resources.database.update_service(&service).await.unwrap();

    let err = resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn test_active_booking_blocks_second_create() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header_a) = common::create_test_user(&resources, "a@example.com", UserRole::User)
        .await
        .unwrap();
    let (_, header_b) = common::create_test_user(&resources, "b@example.com", UserRole::User)
        .await
        .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    resources
        .booking_service
        .create(Some(&header_a), create_request(service.id))
        .await
        .unwrap();

    // Pending occupies the slot, for the owner and everyone else
    for header in [&header_a, &header_b] {
        let err = resources
            .booking_service
            .create(Some(header), create_request(service.id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    }
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_service() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header) = common::create_test_user(&resources, "free@example.com", UserRole::User)
        .await
        .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let booking = resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap();

    resources
        .booking_service
        .update(
            Some(&header),
            booking.id,
            UpdateBookingRequest {
                action: Some(UpdateBookingAction::Cancel),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_lazy_sweep_cancels_lapsed_pending_booking() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, header) =
        common::create_test_user(&resources, "sweep1@example.com", UserRole::User)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let (start, end) = common::lapsed_window();
    let stale = common::create_test_booking(
        &resources,
        user_id,
        service.id,
        BookingStatus::Pending,
        start,
        end,
    )
    .await
    .unwrap();

    // The lapsed pending booking no longer blocks; it gets cancelled
    resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap();

    let swept = resources.database.get_booking(stale.id).await.unwrap().unwrap();
    assert_eq!(swept.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_lazy_sweep_completes_lapsed_confirmed_booking() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, header) =
        common::create_test_user(&resources, "sweep2@example.com", UserRole::User)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let (start, end) = common::lapsed_window();
    let stale = common::create_test_booking(
        &resources,
        user_id,
        service.id,
        BookingStatus::Confirmed,
        start,
        end,
    )
    .await
    .unwrap();

    resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap();

    let swept = resources.database.get_booking(stale.id).await.unwrap().unwrap();
    assert_eq!(swept.status, BookingStatus::Completed);
}

#[tokio::test]
async fn test_admin_cannot_create_bookings() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header) = common::create_test_user(&resources, "admin@example.com", UserRole::Admin)
        .await
        .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let err = resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_get_by_id_distinguishes_missing_from_not_yours() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header_a) = common::create_test_user(&resources, "mine@example.com", UserRole::User)
        .await
        .unwrap();
    let (_, header_b) = common::create_test_user(&resources, "theirs@example.com", UserRole::User)
        .await
        .unwrap();
    let (_, admin_header) =
        common::create_test_user(&resources, "boss@example.com", UserRole::Admin)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let booking = resources
        .booking_service
        .create(Some(&header_a), create_request(service.id))
        .await
        .unwrap();

    // Unknown id: not found
    let err = resources
        .booking_service
        .get_by_id(Some(&header_a), Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // Someone else's booking: forbidden, never "not found"
    let err = resources
        .booking_service
        .get_by_id(Some(&header_b), booking.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    // Admin may fetch any
    assert!(resources
        .booking_service
        .get_by_id(Some(&admin_header), booking.id)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_listing_is_role_scoped_and_newest_first() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_a, header_a) =
        common::create_test_user(&resources, "lista@example.com", UserRole::User)
            .await
            .unwrap();
    let (user_b, _) = common::create_test_user(&resources, "listb@example.com", UserRole::User)
        .await
        .unwrap();
    let (_, admin_header) =
        common::create_test_user(&resources, "listadmin@example.com", UserRole::Admin)
            .await
            .unwrap();
    let service_one = common::create_test_service(&resources).await.unwrap();
    let service_two = common::create_test_service(&resources).await.unwrap();

    let (start, end) = common::future_window();
    let first = common::create_test_booking(
        &resources,
        user_a,
        service_one.id,
        BookingStatus::Pending,
        start,
        end,
    )
    .await
    .unwrap();
    let second = common::create_test_booking(
        &resources,
        user_a,
        service_two.id,
        BookingStatus::Confirmed,
        start,
        end,
    )
    .await
    .unwrap();
    common::create_test_booking(
        &resources,
        user_b,
        service_one.id,
        BookingStatus::Pending,
        start,
        end,
    )
    .await
    .unwrap();

    // User A sees exactly their own two, newest first
    let mine = resources
        .booking_service
        .list(Some(&header_a), BookingListQuery::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, second.id);
    assert_eq!(mine[1].id, first.id);

    // Admin sees all three
    let all = resources
        .booking_service
        .list(Some(&admin_header), BookingListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    // Admin status filter
    let confirmed = resources
        .booking_service
        .list(
            Some(&admin_header),
            BookingListQuery {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, second.id);

    // Admin window filters combine with AND
    let windowed = resources
        .booking_service
        .list(
            Some(&admin_header),
            BookingListQuery {
                status: Some(BookingStatus::Confirmed),
                from: Some(start - Duration::minutes(1)),
                to: Some(end + Duration::minutes(1)),
            },
        )
        .await
        .unwrap();
    assert_eq!(windowed.len(), 1);

    let excluded = resources
        .booking_service
        .list(
            Some(&admin_header),
            BookingListQuery {
                status: None,
                from: Some(end + Duration::minutes(1)),
                to: None,
            },
        )
        .await
        .unwrap();
    assert!(excluded.is_empty());
}

#[tokio::test]
async fn test_reschedule_moves_window_and_keeps_status() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header) = common::create_test_user(&resources, "move@example.com", UserRole::User)
        .await
        .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let booking = resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap();

    let new_start = Utc::now() + Duration::hours(3);
    let new_end = new_start + Duration::hours(1);
    resources
        .booking_service
        .update(
            Some(&header),
            booking.id,
            UpdateBookingRequest {
                action: Some(UpdateBookingAction::Reschedule),
                start_time: Some(new_start),
                end_time: Some(new_end),
                update_status_to: None,
            },
        )
        .await
        .unwrap();

    let moved = resources
        .booking_service
        .get_by_id(Some(&header), booking.id)
        .await
        .unwrap();
    assert_eq!(moved.start_time, new_start);
    assert_eq!(moved.end_time, new_end);
    assert_eq!(moved.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_reschedule_requires_both_times_and_valid_window() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header) = common::create_test_user(&resources, "strict@example.com", UserRole::User)
        .await
        .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let booking = resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap();

    let err = resources
        .booking_service
        .update(
            Some(&header),
            booking.id,
            UpdateBookingRequest {
                action: Some(UpdateBookingAction::Reschedule),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let new_start = Utc::now() + Duration::hours(3);
    let err = resources
        .booking_service
        .update(
            Some(&header),
            booking.id,
            UpdateBookingRequest {
                action: Some(UpdateBookingAction::Reschedule),
                start_time: Some(new_start),
                end_time: Some(new_start - Duration::hours(1)),
                update_status_to: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // Failed reschedules leave the window untouched
    let unchanged = resources
        .booking_service
        .get_by_id(Some(&header), booking.id)
        .await
        .unwrap();
    assert_eq!(unchanged.start_time, booking.start_time);
    assert_eq!(unchanged.end_time, booking.end_time);
}

#[tokio::test]
async fn test_terminal_bookings_reject_user_actions() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, header) =
        common::create_test_user(&resources, "terminal@example.com", UserRole::User)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let (start, end) = common::future_window();
    for status in [BookingStatus::Cancelled, BookingStatus::Completed] {
        let booking = common::create_test_booking(
            &resources,
            user_id,
            service.id,
            status,
            start,
            end,
        )
        .await
        .unwrap();

        for action in [UpdateBookingAction::Cancel, UpdateBookingAction::Reschedule] {
            let err = resources
                .booking_service
                .update(
                    Some(&header),
                    booking.id,
                    UpdateBookingRequest {
                        action: Some(action),
                        start_time: Some(start),
                        end_time: Some(end),
                        update_status_to: None,
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidInput, "{status} x {action:?}");
        }
    }
}

#[tokio::test]
async fn test_update_ownership_is_forbidden_not_missing() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, header_a) = common::create_test_user(&resources, "owna@example.com", UserRole::User)
        .await
        .unwrap();
    let (_, header_b) = common::create_test_user(&resources, "ownb@example.com", UserRole::User)
        .await
        .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let booking = resources
        .booking_service
        .create(Some(&header_a), create_request(service.id))
        .await
        .unwrap();

    let err = resources
        .booking_service
        .update(
            Some(&header_b),
            booking.id,
            UpdateBookingRequest {
                action: Some(UpdateBookingAction::Cancel),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_admin_status_change_is_unrestricted() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, _) = common::create_test_user(&resources, "subject@example.com", UserRole::User)
        .await
        .unwrap();
    let (_, admin_header) =
        common::create_test_user(&resources, "force@example.com", UserRole::Admin)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    let (start, end) = common::future_window();
    let booking = common::create_test_booking(
        &resources,
        user_id,
        service.id,
        BookingStatus::Completed,
        start,
        end,
    )
    .await
    .unwrap();

    // The transition table does not constrain admins: completed -> pending
    resources
        .booking_service
        .update(
            Some(&admin_header),
            booking.id,
            UpdateBookingRequest {
                update_status_to: Some(BookingStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reopened = resources.database.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(reopened.status, BookingStatus::Pending);

    // But the target status is required
    let err = resources
        .booking_service
        .update(
            Some(&admin_header),
            booking.id,
            UpdateBookingRequest::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_delete_rules_for_owner_and_admin() {
    let resources = common::create_test_resources().await.unwrap();
    let (user_id, header) =
        common::create_test_user(&resources, "del@example.com", UserRole::User)
            .await
            .unwrap();
    let (_, stranger_header) =
        common::create_test_user(&resources, "stranger@example.com", UserRole::User)
            .await
            .unwrap();
    let (_, admin_header) =
        common::create_test_user(&resources, "deladmin@example.com", UserRole::Admin)
            .await
            .unwrap();
    let service = common::create_test_service(&resources).await.unwrap();

    // Owner deletes a booking that has not started yet
    let future = resources
        .booking_service
        .create(Some(&header), create_request(service.id))
        .await
        .unwrap();
    let err = resources
        .booking_service
        .delete(Some(&stranger_header), future.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    resources
        .booking_service
        .delete(Some(&header), future.id)
        .await
        .unwrap();
    assert!(resources.database.get_booking(future.id).await.unwrap().is_none());

    // A booking that already started: owner may not delete, admin may
    let started = common::create_test_booking(
        &resources,
        user_id,
        service.id,
        BookingStatus::Confirmed,
        Utc::now() - Duration::minutes(30),
        Utc::now() + Duration::minutes(30),
    )
    .await
    .unwrap();
    let err = resources
        .booking_service
        .delete(Some(&header), started.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    resources
        .booking_service
        .delete(Some(&admin_header), started.id)
        .await
        .unwrap();
    assert!(resources.database.get_booking(started.id).await.unwrap().is_none());
}
