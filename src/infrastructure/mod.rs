pub mod audio;
pub mod geocode;
pub mod llm;
pub mod observability;
pub mod persistence;
pub mod speech;
