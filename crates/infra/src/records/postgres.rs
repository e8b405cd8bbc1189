//! Postgres-backed record store.
//!
//! Table layout:
//!
//! ```sql
//! CREATE TABLE crop_records (
//!     region    TEXT NOT NULL,
//!     crop      TEXT NOT NULL,
//!     month_key TEXT NOT NULL,          -- "MM-YYYY"
//!     price     DOUBLE PRECISION NULL,
//!     demand    DOUBLE PRECISION NULL,
//!     PRIMARY KEY (region, crop, month_key)
//! );
//! ```
//!
//! [`RecordStore`] is synchronous; lookups block on the runtime handle captured
//! at construction. Call them from blocking threads (`spawn_blocking`), never
//! from inside an async task.

use agrocast_core::MonthKey;
use agrocast_forecast::{MonthRecord, RecordStore, StoreError};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tokio::runtime::Handle;
use tracing::{debug, info};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS crop_records (
    region    TEXT NOT NULL,
    crop      TEXT NOT NULL,
    month_key TEXT NOT NULL,
    price     DOUBLE PRECISION NULL,
    demand    DOUBLE PRECISION NULL,
    PRIMARY KEY (region, crop, month_key)
)
"#;

pub struct PostgresRecordStore {
    pool: PgPool,
    handle: Handle,
}

impl PostgresRecordStore {
    /// Connect, make sure the table exists, and capture the current runtime.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(backend)?;

        info!("connected to postgres record store");
        Ok(Self::new(pool, Handle::current()))
    }

    pub fn new(pool: PgPool, handle: Handle) -> Self {
        Self { pool, handle }
    }
}

impl RecordStore for PostgresRecordStore {
    fn get(&self, region: &str, crop: &str, month: MonthKey) -> Result<Option<MonthRecord>, StoreError> {
        let row = self
            .handle
            .block_on(
                sqlx::query(
                    r#"
                    SELECT price, demand
                    FROM crop_records
                    WHERE region = $1 AND crop = $2 AND month_key = $3
                    "#,
                )
                .bind(region)
                .bind(crop)
                .bind(month.to_string())
                .fetch_optional(&self.pool),
            )
            .map_err(backend)?;

        let Some(row) = row else {
            debug!(region, crop, month = %month, "no stored record");
            return Ok(None);
        };

        let price: Option<f64> = row.try_get("price").map_err(backend)?;
        let demand: Option<f64> = row.try_get("demand").map_err(backend)?;
        Ok(Some(MonthRecord::new(price, demand)))
    }

    fn crops(&self, region: &str) -> Result<Vec<String>, StoreError> {
        let rows = self
            .handle
            .block_on(
                sqlx::query("SELECT DISTINCT crop FROM crop_records WHERE region = $1 ORDER BY crop")
                    .bind(region)
                    .fetch_all(&self.pool),
            )
            .map_err(backend)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("crop").map_err(backend))
            .collect()
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}
