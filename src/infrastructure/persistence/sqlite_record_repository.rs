use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row as _, TypeInfo, ValueRef};
use tracing::instrument;

use crate::application::ports::{RecordRepository, RepositoryError, Row};
use crate::domain::PollutionRecord;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS pollution_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
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
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_location ON pollution_records (latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_pollution_type ON pollution_records (pollution_type)",
    "CREATE INDEX IF NOT EXISTS idx_timestamp ON pollution_records (timestamp)",
];

/// Embedded SQLite backend.
///
/// A connection is opened and closed inside each operation; there is no
/// pool and no cross-request shared state beyond the connection string.
pub struct SqliteRecordRepository {
    url: String,
}

impl SqliteRecordRepository {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn connect(&self) -> Result<SqliteConnection, RepositoryError> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true);

        SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl RecordRepository for SqliteRecordRepository {
    #[instrument(skip(self))]
    async fn init_schema(&self) -> Result<(), RepositoryError> {
        let mut conn = self.connect().await?;

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

        tracing::info!(url = %self.url, "SQLite schema initialized");
        Ok(())
    }

    #[instrument(skip(self, record), fields(pollution_type = %record.pollution_type))]
    async fn insert(&self, record: &PollutionRecord) -> Result<i64, RepositoryError> {
        let mut conn = self.connect().await?;

        let raw_response = record.raw_response.to_string();

        let result = sqlx::query(
            "INSERT INTO pollution_records \
             (transcription, recognition_service, latitude, longitude, address, \
              pollution_type, recommendation, responsible_agency, severity_level, \
              immediate_actions, long_term_solution, raw_response, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&record.transcription)
        .bind(&record.recognition_service)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(&record.address)
        .bind(&record.pollution_type)
        .bind(&record.recommendation)
        .bind(&record.responsible_agency)
        .bind(&record.severity_level)
        .bind(&record.immediate_actions)
        .bind(&record.long_term_solution)
        .bind(&raw_response)
        .bind(record.created_at.naive_utc())
        .execute(&mut conn)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.last_insert_rowid())
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

/// Convert one SQLite row into an ordered column-name to JSON-value map,
/// decoding by the value's runtime type.
fn row_to_map(row: &SqliteRow) -> Row {
    let mut map = serde_json::Map::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let value = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => Value::Null,
            Ok(raw) => match raw.type_info().name() {
                "INTEGER" => row
                    .try_get::<i64, _>(idx)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                "REAL" => row
                    .try_get::<f64, _>(idx)
                    .ok()
                    .and_then(|v| serde_json::Number::from_f64(v).map(Value::Number))
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
