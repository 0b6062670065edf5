// ABOUTME: Main library entry point for the BookIt booking platform API
// ABOUTME: Exposes the auth core, booking engine, catalog, and review services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

#![deny(unsafe_code)]

//! # BookIt
//!
//! A booking platform API: users register, browse service offerings, create
//! time-bounded bookings against those services, and leave reviews after
//! completion. Access control distinguishes users from administrators,
//! enforced per-operation.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Auth**: HS256 credential codec issuing access/refresh tokens
//! - **Middleware**: identity resolution (revocation, decode, kind, role)
//! - **Models**: domain entities and the booking transition table
//! - **Database**: SQLite persistence and the revoked-token ledger
//! - **Routes**: axum handlers delegating to per-domain services
//! - **Config**: environment-backed configuration built once at startup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookit::config::environment::ServerConfig;
//! use bookit::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("BookIt configured: {}", config.summary());
//!     Ok(())
//! }
//! ```

/// Credential codec: issue and validate access/refresh tokens
pub mod auth;
/// Environment-backed configuration
pub mod config;
/// SQLite persistence layer and revocation ledger
pub mod database;
/// Unified error handling
pub mod errors;
/// Structured logging setup
pub mod logging;
/// Request authentication middleware
pub mod middleware;
/// Domain models and the booking transition table
pub mod models;
/// HTTP routes and domain services
pub mod routes;
/// Server resources, router assembly, and serving
pub mod server;
