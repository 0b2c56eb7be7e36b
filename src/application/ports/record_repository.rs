use async_trait::async_trait;

use crate::domain::PollutionRecord;

use super::RepositoryError;

/// One query result row as an ordered column-name to value mapping.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Persistence for pollution records, portable across Postgres and SQLite.
///
/// The store is append-only plus age-based deletion; implementations open
/// and close a connection inside each call rather than holding a pool.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Create the `pollution_records` table and its indexes if missing.
    async fn init_schema(&self) -> Result<(), RepositoryError>;

    /// Insert one record and return its assigned identifier.
    async fn insert(&self, record: &PollutionRecord) -> Result<i64, RepositoryError>;

    /// Run an ad-hoc SELECT and return rows with columns in SELECT order.
    async fn select(&self, sql: &str) -> Result<Vec<Row>, RepositoryError>;

    /// Count records created within the last `days` days.
    async fn count_created_since(&self, days: i64) -> Result<i64, RepositoryError>;

    /// Delete records older than `days` days; returns how many were removed.
    async fn delete_older_than(&self, days: i64) -> Result<u64, RepositoryError>;
}
