use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Connection, Row as _, TypeInfo, ValueRef};
use tracing::instrument;

use crate::application::ports::{RecordRepository, RepositoryError, Row};
use crate::domain::PollutionRecord;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS pollution_records (
    id SERIAL PRIMARY KEY,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    transcription TEXT NOT NULL,
    recognition_service TEXT,
    latitude REAL,
    longitude REAL,
    address TEXT,
    pollution_type TEXT,
    recommendation TEXT,
    responsible_agency TEXT,
    severity_level TEXT,
    immediate_actions TEXT,
    long_term_solution TEXT,
    raw_response TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_location ON pollution_records (latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_pollution_type ON pollution_records (pollution_type)",
    "CREATE INDEX IF NOT EXISTS idx_timestamp ON pollution_records (timestamp)",
];

/// PostgreSQL backend. Same per-operation connection discipline as the
/// SQLite backend; only the schema spelling differs.
pub struct PgRecordRepository {
    url: String,
}

impl PgRecordRepository {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn connect(&self) -> Result<PgConnection, RepositoryError> {
        PgConnection::connect(&self.url)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    /// Schema creation retries with backoff: at startup the database
    /// container may not be accepting connections yet.
    #[instrument(skip(self))]
    async fn init_schema(&self) -> Result<(), RepositoryError> {
        let mut retries = 5;
        let mut delay = StdDuration::from_millis(500);

        let mut conn = loop {
            match self.connect().await {
                Ok(conn) => break conn,
                Err(e) if retries > 0 => {
                    retries -= 1;
                    tracing::warn!(
                        error = %e,
                        retries_left = retries,
                        delay_ms = delay.as_millis(),
                        "PostgreSQL connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        };

        sqlx::query(CREATE_TABLE)
            .execute(&mut conn)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        for index in CREATE_INDEXES {
            sqlx::query(index)
                .execute(&mut conn)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        }

        tracing::info!("PostgreSQL schema initialized");
        Ok(())
    }

    #[instrument(skip(self, record), fields(pollution_type = %record.pollution_type))]
    async fn insert(&self, record: &PollutionRecord) -> Result<i64, RepositoryError> {
        let mut conn = self.connect().await?;

        let raw_response = record.raw_response.to_string();

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO pollution_records \
             (transcription, recognition_service, latitude, longitude, address, \
              pollution_type, recommendation, responsible_agency, severity_level, \
              immediate_actions, long_term_solution, raw_response, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING id",
        )
        .bind(&record.transcription)
        .bind(&record.recognition_service)
        .bind(record.latitude.map(|v| v as f32))
        .bind(record.longitude.map(|v| v as f32))
        .bind(&record.address)
        .bind(&record.pollution_type)
        .bind(&record.recommendation)
        .bind(&record.responsible_agency)
        .bind(&record.severity_level)
        .bind(&record.immediate_actions)
        .bind(&record.long_term_solution)
        .bind(&raw_response)
        .bind(record.created_at.naive_utc())
        .fetch_one(&mut conn)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(id as i64)
    }

    #[instrument(skip(self, sql))]
    async fn select(&self, sql: &str) -> Result<Vec<Row>, RepositoryError> {
        let mut conn = self.connect().await?;

        let rows = sqlx::query(sql)
            .fetch_all(&mut conn)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(rows.iter().map(row_to_map).collect())
    }

    #[instrument(skip(self))]
    async fn count_created_since(&self, days: i64) -> Result<i64, RepositoryError> {
        let mut conn = self.connect().await?;
        let cutoff = (Utc::now() - Duration::days(days)).naive_utc();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pollution_records WHERE created_at > $1")
                .bind(cutoff)
                .fetch_one(&mut conn)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError> {
        let mut conn = self.connect().await?;
        let cutoff = (Utc::now() - Duration::days(days)).naive_utc();

        let result = sqlx::query("DELETE FROM pollution_records WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut conn)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// Convert one Postgres row into an ordered column-name to JSON-value
/// map, decoding by the column's declared type.
fn row_to_map(row: &PgRow) -> Row {
    let mut map = serde_json::Map::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let value = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => Value::Null,
            Ok(raw) => match raw.type_info().name() {
                "INT2" => row
                    .try_get::<i16, _>(idx)
                    .map(|v| Value::from(v as i64))
                    .unwrap_or(Value::Null),
                "INT4" => row
                    .try_get::<i32, _>(idx)
                    .map(|v| Value::from(v as i64))
                    .unwrap_or(Value::Null),
                "INT8" => row
                    .try_get::<i64, _>(idx)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                "FLOAT4" => float_value(row.try_get::<f32, _>(idx).map(f64::from)),
                "FLOAT8" => float_value(row.try_get::<f64, _>(idx)),
                "BOOL" => row
                    .try_get::<bool, _>(idx)
                    .map(Value::Bool)
                    .unwrap_or(Value::Null),
                "TIMESTAMP" => row
                    .try_get::<NaiveDateTime, _>(idx)
                    .map(|v| Value::String(v.to_string()))
                    .unwrap_or(Value::Null),
                "TIMESTAMPTZ" => row
                    .try_get::<DateTime<Utc>, _>(idx)
                    .map(|v| Value::String(v.to_rfc3339()))
                    .unwrap_or(Value::Null),
                _ => row
                    .try_get::<String, _>(idx)
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            },
            Err(_) => Value::Null,
        };

        map.insert(column.name().to_string(), value);
    }

    map
}

fn float_value(result: Result<f64, sqlx::Error>) -> Value {
    result
        .ok()
        .and_then(|v| serde_json::Number::from_f64(v).map(Value::Number))
        .unwrap_or(Value::Null)
}
