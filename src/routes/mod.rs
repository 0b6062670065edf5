// ABOUTME: Route module organization for BookIt HTTP endpoints
// ABOUTME: Routes are grouped by domain; handlers stay thin and delegate to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! Route module for the BookIt server
//!
//! This module organizes all HTTP routes by domain. Each domain module
//! contains the request/response types, a service struct holding the business
//! logic, and thin axum handlers that delegate to it.

/// Account registration, sign-in/out, token refresh, and profile routes
pub mod auth;
/// Booking lifecycle routes
pub mod bookings;
/// Health check and system status routes
pub mod health;
/// Review routes
pub mod reviews;
/// Service catalog routes
pub mod services;

pub use auth::AuthService;
pub use bookings::BookingService;
pub use health::HealthRoutes;
pub use reviews::ReviewService;
pub use services::CatalogService;
