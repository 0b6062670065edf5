// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, auth, and entity factories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

#![allow(dead_code, clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Shared test utilities for `bookit`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Once};
use uuid::Uuid;

use bookit::auth::AuthManager;
use bookit::database::Database;
use bookit::models::{Booking, BookingStatus, ServiceOffering, User, UserRole};
use bookit::server::ServerResources;

/// Signing secret shared by every test auth manager
pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

/// Low bcrypt cost keeps hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup (in-memory SQLite)
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Create a test authentication manager with standard expiries
pub fn create_test_auth_manager() -> AuthManager {
    AuthManager::new(TEST_SECRET, 15, 10_080)
}

/// Full server resources over a fresh in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    let auth_manager = create_test_auth_manager();
    Ok(Arc::new(ServerResources::new(database, auth_manager)))
}

/// Format a token as an Authorization header value
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Create a user row directly and mint an access token for it
pub async fn create_test_user(
    resources: &ServerResources,
    email: &str,
    role: UserRole,
) -> Result<(Uuid, String)> {
    let user = User::new("Test User".into(), email.into(), "test_hash".into(), role);
    let user_id = resources.database.create_user(&user).await?;
    let token = resources.auth_manager.issue_access(user_id, role)?;
    Ok((user_id, bearer(&token)))
}

/// Create a user row with a real bcrypt hash for sign-in tests
pub async fn create_test_user_with_password(
    resources: &ServerResources,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<Uuid> {
    let password_hash = bcrypt::hash(password, TEST_BCRYPT_COST)?;
    let user = User::new("Test User".into(), email.into(), password_hash, role);
    let user_id = resources.database.create_user(&user).await?;
    Ok(user_id)
}

/// Create an active service offering
pub async fn create_test_service(resources: &ServerResources) -> Result<ServiceOffering> {
    let service = ServiceOffering::new(
        "Deep Tissue Massage".into(),
        Some("A one-hour deep tissue massage".into()),
        7_500,
        60,
    );
    resources.database.create_service(&service).await?;
    Ok(service)
}

/// Insert a booking row directly with the given status and window
pub async fn create_test_booking(
    resources: &ServerResources,
    user_id: Uuid,
    service_id: Uuid,
    status: BookingStatus,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Booking> {
    let booking = Booking::new(user_id, service_id, start_time, end_time, status);
    let mut tx = resources.database.begin().await?;
    resources.database.insert_booking(&mut tx, &booking).await?;
    tx.commit().await?;
    Ok(booking)
}

/// A future window one to two hours from now
pub fn future_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc::now() + Duration::hours(1);
    (start, start + Duration::hours(1))
}

/// A window that already ended, for lazy-expiry tests
pub fn lapsed_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let end = Utc::now() - Duration::hours(1);
    (end - Duration::hours(1), end)
}
