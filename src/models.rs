// ABOUTME: Core domain models for accounts, service offerings, bookings, and reviews
// ABOUTME: Holds the closed role/status enumerations and the booking transition table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # Data Models
//!
//! Common data structures shared across the BookIt server: user accounts,
//! service offerings, bookings, and reviews, together with the closed
//! enumerations for roles, token kinds, and booking statuses.
//!
//! The booking lifecycle lives here as an explicit transition table
//! ([`BookingStatus::next`]) so that every mutating operation consults one
//! source of truth instead of scattering per-operation checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// User role for the permission system
///
/// A closed enumeration: every role gate matches exhaustively, so an
/// unknown role can never fall through a check silently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Ordinary account: owns bookings and reviews
    User,
    /// Administrator: manages the catalog and any booking
    Admin,
}

impl UserRole {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Token kind carried in every credential
///
/// Access tokens are short-lived and used for API calls; refresh tokens are
/// long-lived and only good for minting new access tokens. The kind claim
/// prevents using one where the other is expected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum BookingStatus {
    /// Created, awaiting confirmation
    #[default]
    Pending,
    /// Confirmed: the service slot is occupied
    Confirmed,
    /// Terminal: withdrawn before completion
    Cancelled,
    /// Terminal: the booking ran to its end
    Completed,
}

/// Action applied to a booking, looked up against the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Cancel,
    Complete,
    Reschedule,
}

impl BookingStatus {
    /// The transition table: state x action -> allowed next state
    ///
    /// Returns `None` when the action is not allowed from this state.
    /// `Reschedule` keeps the current status; it is listed here so that the
    /// "only while pending or confirmed" rule lives in the same table as the
    /// status changes.
    #[must_use]
    pub const fn next(self, action: BookingAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, BookingAction::Confirm) => Some(Self::Confirmed),
            (Self::Pending | Self::Confirmed, BookingAction::Cancel) => Some(Self::Cancelled),
            (Self::Confirmed, BookingAction::Complete) => Some(Self::Completed),
            (Self::Pending, BookingAction::Reschedule) => Some(Self::Pending),
            (Self::Confirmed, BookingAction::Reschedule) => Some(Self::Confirmed),
            _ => None,
        }
    }

    /// Whether this booking occupies its service's single active slot
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether this status admits no further transitions
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(format!("Invalid booking status: {s}"))),
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Full name
    pub full_name: String,
    /// Email address, unique across all accounts
    pub email: String,
    /// Hashed password for authentication
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role for permission checks
    pub role: UserRole,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given details and password hash
    #[must_use]
    pub fn new(full_name: String, email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

/// A bookable service offering in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Unique service identifier
    pub id: Uuid,
    /// Title shown in listings
    pub title: String,
    /// Longer description
    pub description: Option<String>,
    /// Price in minor currency units (cents)
    pub price_cents: i64,
    /// Duration of one booking slot in minutes
    pub duration_mins: i64,
    /// Whether the service can currently be booked
    pub is_active: bool,
    /// When the service was created
    pub created_at: DateTime<Utc>,
}

impl ServiceOffering {
    /// Create a new active service offering
    #[must_use]
    pub fn new(
        title: String,
        description: Option<String>,
        price_cents: i64,
        duration_mins: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            price_cents,
            duration_mins,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// A time-bounded booking of a service by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: Uuid,
    /// Owning account
    pub user_id: Uuid,
    /// Booked service
    pub service_id: Uuid,
    /// Start of the booked window
    pub start_time: DateTime<Utc>,
    /// End of the booked window
    pub end_time: DateTime<Utc>,
    /// Lifecycle status
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new booking owned by `user_id`
    #[must_use]
    pub fn new(
        user_id: Uuid,
        service_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: BookingStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            service_id,
            start_time,
            end_time,
            status,
            created_at: Utc::now(),
        }
    }
}

/// Post-completion feedback, tied 1:1 to a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique review identifier
    pub id: Uuid,
    /// The completed booking this review belongs to (unique)
    pub booking_id: Uuid,
    /// Rating in [1, 5]
    pub rating: i32,
    /// Optional free-text comment
    pub comment: Option<String>,
    /// When the review was created
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a new review for a booking
    #[must_use]
    pub fn new(booking_id: Uuid, rating: i32, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// Rating bounds re-stated as an engine invariant, not just schema validation
pub const MIN_RATING: i32 = 1;
/// Upper rating bound
pub const MAX_RATING: i32 = 5;
