// ABOUTME: SQLite persistence layer for users, services, bookings, reviews, and revoked tokens
// ABOUTME: Raw sqlx queries with manual row mapping; migrations run at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # Database Management
//!
//! This module provides the storage layer for the BookIt server. It owns the
//! connection pool, runs the schema migrations at startup, and exposes typed
//! methods over the five entities plus the revoked-token ledger.
//!
//! Multi-step mutations take a `&mut SqliteConnection` so callers can stage
//! them inside a [`sqlx::Transaction`]: commit happens at the operation
//! boundary, and dropping the transaction on an error path rolls every staged
//! write back.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, Review, ServiceOffering, User, UserRole};

/// Optional conjunctive filters for catalog queries
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    /// Inclusive lower price bound, in cents
    pub price_min_cents: Option<i64>,
    /// Inclusive upper price bound, in cents
    pub price_max_cents: Option<i64>,
    /// Active-status equality
    pub is_active: Option<bool>,
}

/// Optional conjunctive filters for admin booking listings
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Status equality
    pub status: Option<BookingStatus>,
    /// Start-time lower bound (inclusive)
    pub from: Option<DateTime<Utc>>,
    /// End-time upper bound (inclusive)
    pub to: Option<DateTime<Utc>>,
}

/// Database manager for the BookIt entities
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

fn parse_uuid_column(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database("invalid identifier in database row").with_source(e))
}

fn parse_timestamp_column(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database("invalid timestamp in database row").with_source(e))
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be opened or migrations fail
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains("mode=")
            && !database_url.contains(":memory:")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // An in-memory database exists per connection; cap the pool at one
        // so every query sees the same database
        let pool = if connection_options.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Begin a transaction for a multi-step mutation
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired
    pub async fn begin(&self) -> AppResult<Transaction<'_, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
                duration_mins INTEGER NOT NULL CHECK (duration_mins > 0),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                service_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (service_id) REFERENCES services (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_service_id ON bookings(service_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                booking_id TEXT UNIQUE NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (booking_id) REFERENCES bookings (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS revoked_tokens (
                token TEXT PRIMARY KEY,
                revoked_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a new user row
    ///
    /// # Errors
    ///
    /// Returns an error on database failure (including a unique-email
    /// constraint violation; callers check for duplicates first)
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// Fetch a user by email
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// Overwrite a user's mutable fields (full name, email, password hash, role)
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn update_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET full_name = ?1, email = ?2, password_hash = ?3, role = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a user row inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn delete_user(&self, conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id.to_string())
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        let id_str: String = row.try_get("id")?;
        let full_name: String = row.try_get("full_name")?;
        let email: String = row.try_get("email")?;
        let password_hash: String = row.try_get("password_hash")?;
        let role_str: String = row.try_get("role")?;
        let created_at_str: String = row.try_get("created_at")?;

        Ok(User {
            id: parse_uuid_column(&id_str)?,
            full_name,
            email,
            password_hash,
            role: role_str.parse::<UserRole>()?,
            created_at: parse_timestamp_column(&created_at_str)?,
        })
    }

    // ========================================================================
    // Revoked-token ledger
    // ========================================================================

    /// Record a token as revoked; re-revoking is not an error
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn revoke_token(&self, token: &str) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (token, revoked_at) VALUES (?1, ?2)")
            .bind(token)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Transaction-scoped variant of [`Self::revoke_token`]
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn revoke_token_in(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (token, revoked_at) VALUES (?1, ?2)")
            .bind(token)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Point lookup: has this token been revoked?
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn is_token_revoked(&self, token: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT token FROM revoked_tokens WHERE token = ?1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Insert a new service offering
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn create_service(&self, service: &ServiceOffering) -> AppResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO services (id, title, description, price_cents, duration_mins, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(service.id.to_string())
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.price_cents)
        .bind(service.duration_mins)
        .bind(service.is_active)
        .bind(service.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(service.id)
    }

    /// Fetch a service offering by id
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_service(&self, service_id: Uuid) -> AppResult<Option<ServiceOffering>> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ?1")
            .bind(service_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_service(&row)).transpose()
    }

    /// List service offerings matching the conjunctive filter
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn list_services(&self, filter: &ServiceFilter) -> AppResult<Vec<ServiceOffering>> {
        let mut sql = String::from("SELECT * FROM services");
        let mut clauses: Vec<&str> = Vec::new();

        if filter.title.is_some() {
            clauses.push("LOWER(title) LIKE '%' || LOWER(?) || '%'");
        }
        if filter.price_min_cents.is_some() {
            clauses.push("price_cents >= ?");
        }
        if filter.price_max_cents.is_some() {
            clauses.push("price_cents <= ?");
        }
        if filter.is_active.is_some() {
            clauses.push("is_active = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(title) = &filter.title {
            query = query.bind(title);
        }
        if let Some(min) = filter.price_min_cents {
            query = query.bind(min);
        }
        if let Some(max) = filter.price_max_cents {
            query = query.bind(max);
        }
        if let Some(active) = filter.is_active {
            query = query.bind(active);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_service).collect()
    }

    /// Overwrite a service offering's mutable fields
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn update_service(&self, service: &ServiceOffering) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE services SET title = ?1, description = ?2, price_cents = ?3,
                duration_mins = ?4, is_active = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.price_cents)
        .bind(service.duration_mins)
        .bind(service.is_active)
        .bind(service.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a service offering, returning the number of rows removed
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn delete_service(&self, service_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?1")
            .bind(service_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn row_to_service(row: &SqliteRow) -> AppResult<ServiceOffering> {
        let id_str: String = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let description: Option<String> = row.try_get("description")?;
        let price_cents: i64 = row.try_get("price_cents")?;
        let duration_mins: i64 = row.try_get("duration_mins")?;
        let is_active: bool = row.try_get("is_active")?;
        let created_at_str: String = row.try_get("created_at")?;

        Ok(ServiceOffering {
            id: parse_uuid_column(&id_str)?,
            title,
            description,
            price_cents,
            duration_mins,
            is_active,
            created_at: parse_timestamp_column(&created_at_str)?,
        })
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Insert a booking inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn insert_booking(
        &self,
        conn: &mut SqliteConnection,
        booking: &Booking,
    ) -> AppResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, service_id, start_time, end_time, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(booking.id.to_string())
        .bind(booking.user_id.to_string())
        .bind(booking.service_id.to_string())
        .bind(booking.start_time.to_rfc3339())
        .bind(booking.end_time.to_rfc3339())
        .bind(booking.status.as_str())
        .bind(booking.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;

        Ok(booking.id)
    }

    /// The service's most recent booking by creation time, if any
    ///
    /// Runs inside the caller's transaction so the availability check and the
    /// subsequent insert see the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn latest_booking_for_service(
        &self,
        conn: &mut SqliteConnection,
        service_id: Uuid,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query(
            "SELECT * FROM bookings WHERE service_id = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(service_id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|row| Self::row_to_booking(&row)).transpose()
    }

    /// Fetch a booking by id
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = ?1")
            .bind(booking_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_booking(&row)).transpose()
    }

    /// List a user's own bookings, newest first
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn list_bookings_for_user(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        let rows =
            sqlx::query("SELECT * FROM bookings WHERE user_id = ?1 ORDER BY created_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(Self::row_to_booking).collect()
    }

    /// List all bookings matching the conjunctive filter, newest first
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let mut sql = String::from("SELECT * FROM bookings");
        let mut clauses: Vec<&str> = Vec::new();

        if filter.status.is_some() {
            clauses.push("status = ?");
        }
        if filter.from.is_some() {
            clauses.push("start_time >= ?");
        }
        if filter.to.is_some() {
            clauses.push("end_time <= ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(from) = filter.from {
            query = query.bind(from.to_rfc3339());
        }
        if let Some(to) = filter.to {
            query = query.bind(to.to_rfc3339());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_booking).collect()
    }

    /// Set a booking's status inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn set_booking_status(
        &self,
        conn: &mut SqliteConnection,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE bookings SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(booking_id.to_string())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Update a booking's status against the pool
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE bookings SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Move a booking's time window, leaving its status untouched
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn update_booking_window(
        &self,
        booking_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE bookings SET start_time = ?1, end_time = ?2 WHERE id = ?3")
            .bind(start_time.to_rfc3339())
            .bind(end_time.to_rfc3339())
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a booking, returning the number of rows removed
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn delete_booking(&self, booking_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?1")
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn row_to_booking(row: &SqliteRow) -> AppResult<Booking> {
        let id_str: String = row.try_get("id")?;
        let user_id_str: String = row.try_get("user_id")?;
        let service_id_str: String = row.try_get("service_id")?;
        let start_time_str: String = row.try_get("start_time")?;
        let end_time_str: String = row.try_get("end_time")?;
        let status_str: String = row.try_get("status")?;
        let created_at_str: String = row.try_get("created_at")?;

        Ok(Booking {
            id: parse_uuid_column(&id_str)?,
            user_id: parse_uuid_column(&user_id_str)?,
            service_id: parse_uuid_column(&service_id_str)?,
            start_time: parse_timestamp_column(&start_time_str)?,
            end_time: parse_timestamp_column(&end_time_str)?,
            status: status_str.parse::<BookingStatus>()?,
            created_at: parse_timestamp_column(&created_at_str)?,
        })
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    /// Insert a review inside a transaction
    ///
    /// # Errors
    ///
    /// Returns an error on database failure (including the unique-booking
    /// constraint; callers check for an existing review first)
    pub async fn insert_review(
        &self,
        conn: &mut SqliteConnection,
        review: &Review,
    ) -> AppResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, booking_id, rating, comment, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(review.id.to_string())
        .bind(review.booking_id.to_string())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;

        Ok(review.id)
    }

    /// Fetch the review attached to a booking, if any
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_review_for_booking(
        &self,
        conn: &mut SqliteConnection,
        booking_id: Uuid,
    ) -> AppResult<Option<Review>> {
        let row = sqlx::query("SELECT * FROM reviews WHERE booking_id = ?1")
            .bind(booking_id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        row.map(|row| Self::row_to_review(&row)).transpose()
    }

    /// Fetch a review together with the id of the user who owns its booking
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_review_with_owner(
        &self,
        review_id: Uuid,
    ) -> AppResult<Option<(Review, Uuid)>> {
        let row = sqlx::query(
            r#"
            SELECT r.id, r.booking_id, r.rating, r.comment, r.created_at, b.user_id AS owner_id
            FROM reviews r
            JOIN bookings b ON r.booking_id = b.id
            WHERE r.id = ?1
            "#,
        )
        .bind(review_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let review = Self::row_to_review(&row)?;
                let owner_id_str: String = row.try_get("owner_id")?;
                Ok(Some((review, parse_uuid_column(&owner_id_str)?)))
            }
            None => Ok(None),
        }
    }

    /// List all reviews for a service, joining through its bookings
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn list_reviews_for_service(&self, service_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.booking_id, r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN bookings b ON r.booking_id = b.id
            WHERE b.service_id = ?1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(service_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_review).collect()
    }

    /// Overwrite a review's rating and comment
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn update_review(
        &self,
        review_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE reviews SET rating = ?1, comment = ?2 WHERE id = ?3")
            .bind(rating)
            .bind(comment)
            .bind(review_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Fetch a review by id
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn get_review(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query("SELECT * FROM reviews WHERE id = ?1")
            .bind(review_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_review(&row)).transpose()
    }

    /// Delete a review, returning the number of rows removed
    ///
    /// # Errors
    ///
    /// Returns an error on database failure
    pub async fn delete_review(&self, review_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?1")
            .bind(review_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn row_to_review(row: &SqliteRow) -> AppResult<Review> {
        let id_str: String = row.try_get("id")?;
        let booking_id_str: String = row.try_get("booking_id")?;
        let rating: i32 = row.try_get("rating")?;
        let comment: Option<String> = row.try_get("comment")?;
        let created_at_str: String = row.try_get("created_at")?;

        Ok(Review {
            id: parse_uuid_column(&id_str)?,
            booking_id: parse_uuid_column(&booking_id_str)?,
            rating,
            comment,
            created_at: parse_timestamp_column(&created_at_str)?,
        })
    }
}
