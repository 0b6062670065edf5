// ABOUTME: JWT credential codec issuing and validating access/refresh tokens
// ABOUTME: Pure cryptographic transform with no I/O; revocation lives in the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # Credential Codec
//!
//! Issues and validates the signed, time-bound credentials that carry subject
//! identity, role, and token kind. Tokens are HS256-signed with a process-wide
//! secret; access tokens are short-lived, refresh tokens long-lived, and both
//! carry a `kind` claim so one can never stand in for the other.
//!
//! The codec is a stateless service object constructed once at startup and
//! injected wherever credentials are minted or checked. It performs no I/O;
//! revocation is the [`crate::database::Database`] ledger's concern, consulted
//! by [`crate::middleware::AuthMiddleware`] before this codec ever runs.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{TokenKind, UserRole};

/// Token validation error with detailed information
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenError {
    /// Token has expired
    #[error("token expired at {expired_at}")]
    Expired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature is invalid
    #[error("token signature is invalid: {reason}")]
    Invalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not a proper JWT)
    #[error("token is malformed: {details}")]
    Malformed {
        /// Details about the malformation
        details: String,
    },
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired { .. } => Self::auth_expired(),
            TokenError::Invalid { reason } => Self::auth_invalid(reason),
            TokenError::Malformed { details } => Self::auth_invalid(details),
        }
    }
}

/// JWT claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// Role embedded at issue time
    pub role: UserRole,
    /// Token kind: access or refresh
    pub kind: TokenKind,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,
}

/// Authentication manager issuing and validating HS256 tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry_mins: i64,
    refresh_expiry_mins: i64,
}

impl AuthManager {
    /// Create a new authentication manager from the process-wide secret
    #[must_use]
    pub fn new(secret: &[u8], access_expiry_mins: i64, refresh_expiry_mins: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_expiry_mins,
            refresh_expiry_mins,
        }
    }

    /// Issue a short-lived access token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn issue_access(&self, user_id: Uuid, role: UserRole) -> Result<String, TokenError> {
        self.issue(user_id, role, TokenKind::Access, self.access_expiry_mins)
    }

    /// Issue a long-lived refresh token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn issue_refresh(&self, user_id: Uuid, role: UserRole) -> Result<String, TokenError> {
        self.issue(user_id, role, TokenKind::Refresh, self.refresh_expiry_mins)
    }

    fn issue(
        &self,
        user_id: Uuid,
        role: UserRole,
        kind: TokenKind,
        expiry_mins: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiry = now + Duration::minutes(expiry_mins);

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            kind,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("JWT encoding failed: {e}");
            TokenError::Invalid {
                reason: format!("token encoding failed: {e}"),
            }
        })
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if:
    /// - Token signature is invalid
    /// - Token has expired
    /// - Token is malformed or its claims cannot be deserialized
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(e) => Err(self.convert_jwt_error(&e, token)),
        }
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(&self, e: &jsonwebtoken::errors::Error, token: &str) -> TokenError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("JWT token validation failed: {e:?}");

        match e.kind() {
            ErrorKind::ExpiredSignature => {
                // Re-decode without expiry validation to recover when it expired
                let expired_at = self.peek_expiry(token).unwrap_or_else(Utc::now);
                tracing::debug!("JWT token expired at {}", expired_at.to_rfc3339());
                TokenError::Expired { expired_at }
            }
            ErrorKind::InvalidSignature => TokenError::Invalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => TokenError::Malformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => TokenError::Malformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => TokenError::Malformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => TokenError::Malformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => TokenError::Invalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Best-effort expiry extraction from an already-rejected token
    fn peek_expiry(&self, token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).ok()?;
        DateTime::from_timestamp(token_data.claims.exp, 0)
    }
}

/// Generate a random 64-character alphanumeric secret for development setups
#[must_use]
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
