// ABOUTME: Middleware module organization for request authentication
// ABOUTME: Exposes the identity resolver used by every protected route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

/// Bearer-token authentication and role gating
pub mod auth;

pub use auth::{AuthMiddleware, AuthResult};
