use chrono::{DateTime, Utc};

/// One processed audio report, as inserted into the store.
///
/// The row identifier is assigned by the database on insert. Latitude and
/// longitude are either both set or both `None`; `transcription` is always
/// non-empty, even on the fallback path. Records are append-only: nothing
/// mutates a row after insertion.
#[derive(Debug, Clone)]
pub struct PollutionRecord {
    pub transcription: String,
    pub recognition_service: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub pollution_type: String,
    pub recommendation: String,
    pub responsible_agency: String,
    pub severity_level: String,
    pub immediate_actions: String,
    pub long_term_solution: String,
    /// Opaque diagnostic payload, typically the literal model output.
    pub raw_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
