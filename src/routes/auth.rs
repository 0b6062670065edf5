// ABOUTME: Account route handlers for registration, sign-in/out, refresh, and profile management
// ABOUTME: Thin axum handlers delegating to AuthService business logic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! Authentication routes for account management
//!
//! This module handles user registration, sign-in, sign-out, token refresh,
//! and profile operations. All handlers are thin wrappers that delegate to
//! [`AuthService`].

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthMiddleware;
use crate::models::{TokenKind, User, UserRole};
use crate::server::{bearer_header, ServerResources};

/// Account registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Account registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign-in request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign-out request; the access token arrives in the Authorization header
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub access_token: String,
}

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

/// Partial profile update; unsupplied fields keep their prior values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub password: Option<String>,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Account service for registration, sessions, and profiles
#[derive(Clone)]
pub struct AuthService {
    database: Arc<Database>,
    auth_manager: Arc<crate::auth::AuthManager>,
    middleware: AuthMiddleware,
}

impl AuthService {
    #[must_use]
    pub fn new(database: Arc<Database>, auth_manager: Arc<crate::auth::AuthManager>) -> Self {
        let middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());
        Self {
            database,
            auth_manager,
            middleware,
        }
    }

    /// The identity resolver backing this service
    #[must_use]
    pub const fn middleware(&self) -> &AuthMiddleware {
        &self.middleware
    }

    /// Handle account registration
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the email is taken, or an error
    /// when validation, hashing, or persistence fails
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        tracing::info!("Account registration attempt for email: {}", request.email);

        if request.full_name.trim().is_empty() {
            return Err(AppError::invalid_input("full_name must not be empty"));
        }
        if !is_valid_email(&request.email) {
            return Err(AppError::invalid_input("email address is not valid"));
        }
        if request.password.len() < 8 {
            return Err(AppError::invalid_input(
                "password must be at least 8 characters",
            ));
        }

        if self
            .database
            .get_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::already_exists(
                "account with this email already exists, sign in",
            ));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = User::new(
            request.full_name,
            request.email.clone(),
            password_hash,
            request.role,
        );
        let user_id = self.database.create_user(&user).await?;

        let access_token = self.auth_manager.issue_access(user_id, user.role)?;
        let refresh_token = self.auth_manager.issue_refresh(user_id, user.role)?;

        tracing::info!(
            "Account registered successfully: {} ({user_id})",
            request.email
        );

        Ok(RegisterResponse {
            message: "user account created".into(),
            access_token,
            refresh_token,
        })
    }

    /// Handle sign-in
    ///
    /// # Errors
    ///
    /// Returns one generic invalid-credentials error for both a missing
    /// account and a wrong password, so account existence never leaks
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        tracing::info!("Sign-in attempt for email: {}", request.email);

        let user = self
            .database
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("email or password incorrect"))?;

        // bcrypt verification is CPU-expensive; keep it off the async executor
        let password = request.password.clone();
        let password_hash = user.password_hash.clone();
        let is_valid =
            tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
                .await
                .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Password verification error: {e}")))?;

        if !is_valid {
            tracing::warn!("Invalid password for account: {}", request.email);
            return Err(AppError::auth_invalid("email or password incorrect"));
        }

        let access_token = self.auth_manager.issue_access(user.id, user.role)?;
        let refresh_token = self.auth_manager.issue_refresh(user.id, user.role)?;

        tracing::info!("Signed in successfully: {} ({})", request.email, user.id);

        Ok(LoginResponse {
            message: "login successful".into(),
            access_token,
            refresh_token,
        })
    }

    /// Handle sign-out: revoke both tokens
    ///
    /// The access token is validated cryptographically but deliberately not
    /// checked against the revocation ledger, so calling logout twice still
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the access token is malformed/expired or the
    /// ledger write fails
    pub async fn logout(
        &self,
        auth_header: Option<&str>,
        request: LogoutRequest,
    ) -> AppResult<MessageResponse> {
        let access_token = crate::middleware::auth::extract_bearer_token(auth_header)?;

        let claims = self.auth_manager.decode(access_token)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::wrong_token_kind(TokenKind::Access, claims.kind));
        }

        let mut tx = self.database.begin().await?;
        self.database.revoke_token_in(&mut tx, access_token).await?;
        self.database
            .revoke_token_in(&mut tx, &request.refresh_token)
            .await?;
        tx.commit().await?;

        tracing::info!("Signed out subject {}", claims.sub);

        Ok(MessageResponse {
            message: "logged out".into(),
        })
    }

    /// Mint a new access token from a valid refresh token
    ///
    /// # Errors
    ///
    /// Returns an error when the refresh token is revoked, invalid, expired,
    /// or of the wrong kind
    pub async fn refresh_access(&self, request: RefreshRequest) -> AppResult<RefreshResponse> {
        let auth = self
            .middleware
            .authenticate_token(&request.refresh_token, TokenKind::Refresh)
            .await?;

        let access_token = self.auth_manager.issue_access(auth.user_id, auth.role)?;

        tracing::debug!("Issued fresh access token for user {}", auth.user_id);

        Ok(RefreshResponse {
            message: "access token refreshed".into(),
            access_token,
        })
    }

    /// Fetch the authenticated account's profile
    ///
    /// # Errors
    ///
    /// Returns an error when authentication fails or the account is gone
    pub async fn get_profile(&self, auth_header: Option<&str>) -> AppResult<ProfileResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let user = self
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account"))?;

        Ok(ProfileResponse {
            full_name: user.full_name,
            email: user.email,
            role: user.role,
        })
    }

    /// Apply a partial profile update; unsupplied fields keep prior values
    ///
    /// # Errors
    ///
    /// Returns an error when authentication fails, the account is gone, or a
    /// supplied email collides with another account
    pub async fn update_profile(
        &self,
        auth_header: Option<&str>,
        request: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        let auth = self
            .middleware
            .authenticate_request(auth_header, TokenKind::Access)
            .await?;

        let mut user = self
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account"))?;

        if let Some(full_name) = request.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = request.email {
            if email != user.email {
                if !is_valid_email(&email) {
                    return Err(AppError::invalid_input("email address is not valid"));
                }
                if self.database.get_user_by_email(&email).await?.is_some() {
                    return Err(AppError::already_exists(
                        "account with this email already exists",
                    ));
                }
                user.email = email;
            }
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(password) = request.password {
            if password.len() < 8 {
                return Err(AppError::invalid_input(
                    "password must be at least 8 characters",
                ));
            }
            user.password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
                .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        }

        self.database.update_user(&user).await?;

        tracing::info!("Profile updated for user {}", user.id);

        Ok(ProfileResponse {
            full_name: user.full_name,
            email: user.email,
            role: user.role,
        })
    }

    /// Delete the authenticated account and revoke the presented token
    ///
    /// # Errors
    ///
    /// Returns an error when authentication fails or the account is gone
    pub async fn delete_account(&self, auth_header: Option<&str>) -> AppResult<MessageResponse> {
        let access_token = crate::middleware::auth::extract_bearer_token(auth_header)?;
        let auth = self
            .middleware
            .authenticate_token(access_token, TokenKind::Access)
            .await?;

        // Row removal and token revocation stand or fall together
        let mut tx = self.database.begin().await?;
        let removed = self.database.delete_user(&mut tx, auth.user_id).await?;
        if removed == 0 {
            return Err(AppError::not_found("Account"));
        }
        self.database.revoke_token_in(&mut tx, access_token).await?;
        tx.commit().await?;

        tracing::info!("Account deleted: {}", auth.user_id);

        Ok(MessageResponse {
            message: "account deleted".into(),
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Authentication route handlers
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all account routes
    pub fn router() -> Router<Arc<ServerResources>> {
        Router::new()
            .route("/auth/register", post(register_handler))
            .route("/auth/login", post(login_handler))
            .route("/auth/logout", post(logout_handler))
            .route("/auth/refresh", post(refresh_handler))
            .route("/auth/me", get(get_profile_handler).patch(update_profile_handler))
            .route("/auth/me/delete", post(delete_account_handler))
    }
}

async fn register_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = resources.auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(resources.auth_service.login(request).await?))
}

async fn logout_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = resources
        .auth_service
        .logout(bearer_header(&headers), request)
        .await?;
    Ok(Json(response))
}

async fn refresh_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    Ok(Json(resources.auth_service.refresh_access(request).await?))
}

async fn get_profile_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, AppError> {
    let response = resources
        .auth_service
        .get_profile(bearer_header(&headers))
        .await?;
    Ok(Json(response))
}

async fn update_profile_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let response = resources
        .auth_service
        .update_profile(bearer_header(&headers), request)
        .await?;
    Ok(Json(response))
}

async fn delete_account_handler(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    let response = resources
        .auth_service
        .delete_account(bearer_header(&headers))
        .await?;
    Ok(Json(response))
}
