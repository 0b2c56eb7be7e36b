mod backend;
mod pg_record_repository;
mod sqlite_record_repository;

pub use backend::repository_for_url;
pub use pg_record_repository::PgRecordRepository;
pub use sqlite_record_repository::SqliteRecordRepository;
