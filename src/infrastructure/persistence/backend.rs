use std::sync::Arc;

use crate::application::ports::{RecordRepository, RepositoryError};

use super::{PgRecordRepository, SqliteRecordRepository};

/// Pick the storage backend from the connection-string scheme. The choice
/// is made once at startup and is fixed for the repository's lifetime.
pub fn repository_for_url(database_url: &str) -> Result<Arc<dyn RecordRepository>, RepositoryError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        tracing::info!("Using PostgreSQL record store");
        Ok(Arc::new(PgRecordRepository::new(database_url)))
    } else if database_url.starts_with("sqlite:") {
        tracing::info!("Using SQLite record store");
        Ok(Arc::new(SqliteRecordRepository::new(database_url)))
    } else {
        let scheme = database_url
            .split(':')
            .next()
            .unwrap_or(database_url)
            .to_string();
        Err(RepositoryError::UnsupportedScheme(scheme))
    }
}
