// ABOUTME: Identity resolver combining the credential codec with the revocation ledger
// ABOUTME: Produces a typed identity (subject, role, kind) from a raw bearer token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # Authentication Middleware
//!
//! Resolves a raw bearer credential into a typed identity. The check order is
//! deliberate and load-bearing:
//!
//! 1. revocation ledger lookup: a revoked token is rejected before signature
//!    or expiry are even examined, so logout takes effect immediately and is
//!    reported distinctly;
//! 2. cryptographic decode: malformed/bad-signature vs expired are surfaced
//!    as separate errors;
//! 3. kind check: a refresh token can never stand in for an access token,
//!    nor the reverse.
//!
//! There is no in-process revocation cache: every authorization re-queries the
//! ledger, trading a point lookup per request for always-fresh revocation.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthManager;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{TokenKind, UserRole};

/// Authenticated identity extracted from a validated token
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: Uuid,
    /// Role embedded in the token at issue time
    pub role: UserRole,
    /// Kind of the presented token
    pub kind: TokenKind,
}

/// Middleware authenticating bearer tokens for protected routes
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The header is missing or does not carry a bearer token
    /// - The token is revoked, malformed, badly signed, or expired
    /// - The token kind does not match `expected_kind`
    pub async fn authenticate_request(
        &self,
        auth_header: Option<&str>,
        expected_kind: TokenKind,
    ) -> AppResult<AuthResult> {
        let token = extract_bearer_token(auth_header)?;
        self.authenticate_token(token, expected_kind).await
    }

    /// Authenticate a raw token string
    ///
    /// # Errors
    ///
    /// Returns an error as described on [`Self::authenticate_request`]
    pub async fn authenticate_token(
        &self,
        token: &str,
        expected_kind: TokenKind,
    ) -> AppResult<AuthResult> {
        // Revocation first: a revoked token must be rejected as revoked even
        // while it is still cryptographically valid
        if self.database.is_token_revoked(token).await? {
            tracing::debug!("Rejected revoked token");
            return Err(AppError::auth_revoked());
        }

        let claims = self.auth_manager.decode(token)?;

        if claims.kind != expected_kind {
            tracing::debug!(
                "Rejected {} token where {} token was expected",
                claims.kind,
                expected_kind
            );
            return Err(AppError::wrong_token_kind(expected_kind, claims.kind));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid subject in token"))?;

        Ok(AuthResult {
            user_id,
            role: claims.role,
            kind: claims.kind,
        })
    }

    /// Require the identity to carry exactly the given role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the roles differ
    pub fn require_role(auth: &AuthResult, required: UserRole) -> AppResult<()> {
        match (auth.role, required) {
            (UserRole::User, UserRole::User) | (UserRole::Admin, UserRole::Admin) => Ok(()),
            (UserRole::User, UserRole::Admin) => {
                Err(AppError::forbidden("Admin access required"))
            }
            (UserRole::Admin, UserRole::User) => {
                Err(AppError::forbidden("This action is for user accounts"))
            }
        }
    }
}

/// Strip the `Bearer ` prefix from an `Authorization` header value
///
/// # Errors
///
/// Returns `AuthRequired` when the header is absent or not a bearer scheme
pub fn extract_bearer_token(auth_header: Option<&str>) -> AppResult<&str> {
    auth_header
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(AppError::auth_required)
}
