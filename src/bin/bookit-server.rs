// ABOUTME: BookIt API server binary: config, logging, database, then serve
// ABOUTME: All process wiring happens here; the library stays framework-clean
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # BookIt API Server Binary
//!
//! Starts the booking platform API with JWT authentication, the booking
//! lifecycle engine, and SQLite-backed persistence.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use bookit::auth::AuthManager;
use bookit::config::environment::ServerConfig;
use bookit::database::Database;
use bookit::server::{serve, ServerResources};
use bookit::logging;

#[derive(Parser)]
#[command(name = "bookit-server")]
#[command(about = "BookIt - booking platform API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    logging::init_from_config(&config.logging)?;

    info!("Starting BookIt API");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized: {}", config.database.url);

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.access_expiry_mins,
        config.auth.refresh_expiry_mins,
    );

    let resources = Arc::new(ServerResources::new(database, auth_manager));

    serve(&config, resources).await?;

    info!("BookIt API stopped");
    Ok(())
}
