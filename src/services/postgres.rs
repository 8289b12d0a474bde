use crate::models::{AttractionSummary, DestinationSummary, ResultSnapshot, StoredResult, UserProfile};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// A result snapshot ready to be written
#[derive(Debug, Clone)]
pub struct NewResult<'a> {
    pub attempt_id: Uuid,
    pub user_id: &'a str,
    pub region_id: Option<i64>,
    pub profile: &'a UserProfile,
    pub snapshot: &'a ResultSnapshot,
}

/// PostgreSQL store for recommendation snapshots
///
/// Each quiz attempt is written at most once: `attempt_id` is unique and
/// repeated inserts are ignored, so retries and concurrent submissions of the
/// same attempt cannot create duplicate history entries.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Store a result snapshot for an attempt
    ///
    /// Returns `true` when the row was written, `false` when the attempt had
    /// already been stored.
    pub async fn save_result(&self, result: NewResult<'_>) -> Result<bool, PostgresError> {
        let query = r#"
            INSERT INTO quiz_results
                (attempt_id, user_id, region_id, profile, recommended_destinations, recommended_attractions)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (attempt_id) DO NOTHING
        "#;

        let outcome = sqlx::query(query)
            .bind(result.attempt_id)
            .bind(result.user_id)
            .bind(result.region_id)
            .bind(Json(result.profile))
            .bind(Json(&result.snapshot.recommended_destinations))
            .bind(Json(&result.snapshot.recommended_attractions))
            .execute(&self.pool)
            .await?;

        let inserted = outcome.rows_affected() > 0;

        if inserted {
            tracing::debug!("Stored result for attempt {} (user {})", result.attempt_id, result.user_id);
        } else {
            tracing::debug!("Attempt {} already stored, skipping", result.attempt_id);
        }

        Ok(inserted)
    }

    /// Get a stored result by id, only if it belongs to `user_id`
    ///
    /// Someone else's result reads as not found.
    pub async fn get_result(&self, id: i64, user_id: &str) -> Result<StoredResult, PostgresError> {
        let query = r#"
            SELECT id, attempt_id, user_id, region_id, profile,
                   recommended_destinations, recommended_attractions, created_at
            FROM quiz_results
            WHERE id = $1 AND user_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Result {} not found", id)))?;

        stored_result_from_row(&row)
    }

    /// List a user's stored results, newest first
    pub async fn list_results(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredResult>, PostgresError> {
        let query = r#"
            SELECT id, attempt_id, user_id, region_id, profile,
                   recommended_destinations, recommended_attractions, created_at
            FROM quiz_results
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        let results = rows
            .iter()
            .map(stored_result_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("User {} has {} stored results in page", user_id, results.len());

        Ok(results)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn stored_result_from_row(row: &PgRow) -> Result<StoredResult, PostgresError> {
    let profile: Json<UserProfile> = row.try_get("profile")?;
    let destinations: Json<Vec<DestinationSummary>> = row.try_get("recommended_destinations")?;
    let attractions: Json<Vec<AttractionSummary>> = row.try_get("recommended_attractions")?;

    Ok(StoredResult {
        id: row.try_get("id")?,
        attempt_id: row.try_get("attempt_id")?,
        user_id: row.try_get("user_id")?,
        region_id: row.try_get("region_id")?,
        profile: profile.0,
        snapshot: ResultSnapshot {
            recommended_destinations: destinations.0,
            recommended_attractions: attractions.0,
        },
        created_at: row.try_get("created_at")?,
    })
}
