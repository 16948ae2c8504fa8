//! PostgreSQL park store
//!
//! Provides national park and trail persistence using SQLx and PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use super::ParkRepository;
use crate::config::DatabaseConfig;
use crate::models::{
    Difficulty, NationalPark, NationalParkDraft, ParkId, Trail, TrailDraft, TrailId,
};
use crate::{ParkyError, Result};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS national_parks (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        state TEXT NOT NULL,
        created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        established TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS national_parks_name_key ON national_parks (LOWER(name))",
    r#"
    CREATE TABLE IF NOT EXISTS trails (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        distance DOUBLE PRECISION NOT NULL,
        elevation DOUBLE PRECISION NOT NULL,
        difficulty TEXT NOT NULL
            CHECK (difficulty IN ('Easy', 'Moderate', 'Difficult', 'Expert')),
        national_park_id INTEGER NOT NULL
            REFERENCES national_parks (id) ON DELETE RESTRICT,
        date_created TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS trails_name_key ON trails (LOWER(name))",
    "CREATE INDEX IF NOT EXISTS trails_national_park_id_idx ON trails (national_park_id)",
];

const TRAIL_SELECT: &str = r#"
    SELECT
        t.id, t.name, t.distance, t.elevation, t.difficulty,
        t.national_park_id, t.date_created,
        p.name AS park_name, p.state AS park_state,
        p.created AS park_created, p.established AS park_established
    FROM trails t
    JOIN national_parks p ON p.id = t.national_park_id
"#;

/// PostgreSQL park store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.postgres_url)
            .await
            .map_err(|e| ParkyError::Database(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the park and trail tables when missing
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| ParkyError::Database(format!("Failed to apply schema: {e}")))?;
        }
        tracing::debug!("park schema ready");
        Ok(())
    }
}

/// Classification of a failed write
enum WriteFailure {
    Unique,
    ForeignKey,
    Other,
}

fn classify(err: &sqlx::Error) -> WriteFailure {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => WriteFailure::Unique,
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            WriteFailure::ForeignKey
        }
        _ => WriteFailure::Other,
    }
}

/// National park row from database
#[derive(Debug, FromRow)]
struct NationalParkRow {
    id: i32,
    name: String,
    state: String,
    created: DateTime<Utc>,
    established: DateTime<Utc>,
}

impl From<NationalParkRow> for NationalPark {
    fn from(row: NationalParkRow) -> Self {
        NationalPark {
            id: row.id,
            name: row.name,
            state: row.state,
            created: row.created,
            established: row.established,
        }
    }
}

/// Trail row joined with its park
#[derive(Debug, FromRow)]
struct TrailRow {
    id: i32,
    name: String,
    distance: f64,
    elevation: f64,
    difficulty: String,
    national_park_id: i32,
    date_created: DateTime<Utc>,
    park_name: String,
    park_state: String,
    park_created: DateTime<Utc>,
    park_established: DateTime<Utc>,
}

impl TryFrom<TrailRow> for Trail {
    type Error = ParkyError;

    fn try_from(row: TrailRow) -> Result<Self> {
        let difficulty: Difficulty = row
            .difficulty
            .parse()
            .map_err(|e: String| ParkyError::Database(format!("Corrupt trail {}: {e}", row.id)))?;

        Ok(Trail {
            id: row.id,
            name: row.name,
            distance: row.distance,
            elevation: row.elevation,
            difficulty,
            national_park_id: row.national_park_id,
            date_created: row.date_created,
            national_park: Some(NationalPark {
                id: row.national_park_id,
                name: row.park_name,
                state: row.park_state,
                created: row.park_created,
                established: row.park_established,
            }),
        })
    }
}

fn trails_from_rows(rows: Vec<TrailRow>) -> Result<Vec<Trail>> {
    rows.into_iter().map(Trail::try_from).collect()
}

#[async_trait]
impl ParkRepository for PgStore {
    async fn list_national_parks(&self) -> Result<Vec<NationalPark>> {
        let rows: Vec<NationalParkRow> = sqlx::query_as(
            "SELECT id, name, state, created, established FROM national_parks ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ParkyError::Database(format!("Failed to list national parks: {e}")))?;

        Ok(rows.into_iter().map(NationalPark::from).collect())
    }

    async fn get_national_park(&self, id: ParkId) -> Result<Option<NationalPark>> {
        let row: Option<NationalParkRow> = sqlx::query_as(
            "SELECT id, name, state, created, established FROM national_parks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ParkyError::Database(format!("Failed to get national park: {e}")))?;

        Ok(row.map(NationalPark::from))
    }

    async fn national_park_exists(&self, id: ParkId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM national_parks WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Failed to check national park: {e}")))
    }

    async fn national_park_name_exists(&self, name: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM national_parks WHERE LOWER(name) = LOWER(TRIM($1)))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ParkyError::Database(format!("Failed to check national park name: {e}")))
    }

    async fn create_national_park(&self, draft: &NationalParkDraft) -> Result<NationalPark> {
        let row: NationalParkRow = sqlx::query_as(
            r#"
            INSERT INTO national_parks (name, state, established)
            VALUES ($1, $2, $3)
            RETURNING id, name, state, created, established
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.state)
        .bind(draft.established)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match classify(&e) {
            WriteFailure::Unique => ParkyError::Conflict("National Park Exists!".to_string()),
            _ => ParkyError::Database(format!(
                "Something went wrong when saving the record {}: {e}",
                draft.name
            )),
        })?;

        Ok(row.into())
    }

    async fn update_national_park(&self, id: ParkId, draft: &NationalParkDraft) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE national_parks SET name = $2, state = $3, established = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.state)
        .bind(draft.established)
        .execute(&self.pool)
        .await
        .map_err(|e| match classify(&e) {
            WriteFailure::Unique => ParkyError::Conflict("National Park Exists!".to_string()),
            _ => ParkyError::Database(format!(
                "Something went wrong when updating the record {}: {e}",
                draft.name
            )),
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_national_park(&self, id: ParkId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM national_parks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match classify(&e) {
                WriteFailure::ForeignKey => {
                    ParkyError::Conflict(format!("National park {id} still has trails"))
                }
                _ => ParkyError::Database(format!("Failed to delete national park: {e}")),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_trails(&self) -> Result<Vec<Trail>> {
        let sql = format!("{TRAIL_SELECT} ORDER BY t.name");
        let rows: Vec<TrailRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Failed to list trails: {e}")))?;

        trails_from_rows(rows)
    }

    async fn get_trail(&self, id: TrailId) -> Result<Option<Trail>> {
        let sql = format!("{TRAIL_SELECT} WHERE t.id = $1");
        let row: Option<TrailRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Failed to get trail: {e}")))?;

        row.map(Trail::try_from).transpose()
    }

    async fn trails_in_national_park(&self, park_id: ParkId) -> Result<Vec<Trail>> {
        let sql = format!("{TRAIL_SELECT} WHERE t.national_park_id = $1 ORDER BY t.name");
        let rows: Vec<TrailRow> = sqlx::query_as(&sql)
            .bind(park_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Failed to list park trails: {e}")))?;

        trails_from_rows(rows)
    }

    async fn trail_exists(&self, id: TrailId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM trails WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Failed to check trail: {e}")))
    }

    async fn trail_name_exists(&self, name: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM trails WHERE LOWER(name) = LOWER(TRIM($1)))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ParkyError::Database(format!("Failed to check trail name: {e}")))
    }

    async fn create_trail(&self, draft: &TrailDraft) -> Result<Trail> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO trails (name, distance, elevation, difficulty, national_park_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(draft.distance)
        .bind(draft.elevation)
        .bind(draft.difficulty.as_str())
        .bind(draft.national_park_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match classify(&e) {
            WriteFailure::Unique => ParkyError::Conflict("Trail Exists!".to_string()),
            WriteFailure::ForeignKey => ParkyError::Validation(format!(
                "National park {} does not exist",
                draft.national_park_id
            )),
            WriteFailure::Other => ParkyError::Database(format!(
                "Something went wrong when saving the record {}: {e}",
                draft.name
            )),
        })?;

        self.get_trail(id)
            .await?
            .ok_or_else(|| ParkyError::NotFound(format!("Trail {id}")))
    }

    async fn update_trail(&self, id: TrailId, draft: &TrailDraft) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE trails SET
                name = $2,
                distance = $3,
                elevation = $4,
                difficulty = $5,
                national_park_id = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.distance)
        .bind(draft.elevation)
        .bind(draft.difficulty.as_str())
        .bind(draft.national_park_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match classify(&e) {
            WriteFailure::Unique => ParkyError::Conflict("Trail Exists!".to_string()),
            WriteFailure::ForeignKey => ParkyError::Validation(format!(
                "National park {} does not exist",
                draft.national_park_id
            )),
            WriteFailure::Other => ParkyError::Database(format!(
                "Something went wrong when updating the record {}: {e}",
                draft.name
            )),
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_trail(&self, id: TrailId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trails WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Failed to delete trail: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ParkyError::Database(format!("Health check failed: {e}")))?;
        Ok(())
    }
}
