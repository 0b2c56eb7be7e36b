mod analysis_service;
mod classification_service;
mod location_service;
mod record_service;
mod transcription_service;

pub use analysis_service::{AnalysisError, AnalysisReport, AnalysisService};
pub use classification_service::{Classification, ClassificationService};
pub use location_service::{extract_candidates, parse_coordinates, LocationService};
pub use record_service::{PollutionTypeCount, QueryOutcome, RecordService, StoreStatistics};
pub use transcription_service::{
    Transcription, TranscriptionError, TranscriptionMetadata, TranscriptionService,
    FALLBACK_SERVICE, SUPPORTED_EXTENSIONS,
};
