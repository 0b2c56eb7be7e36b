use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::RepositoryError;
use crate::domain::{LocationResult, PollutionRecord};

use super::classification_service::{Classification, ClassificationService};
use super::location_service::LocationService;
use super::record_service::RecordService;
use super::transcription_service::{TranscriptionError, TranscriptionService};

/// End-to-end result of one analysis request, echoed back to the caller
/// after the record has been stored.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub transcription: String,
    pub recognition_service: String,
    pub location: LocationResult,
    pub classification: Classification,
    pub record_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error("failed to store record: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Orchestrates one request through transcription, location extraction,
/// classification and persistence, in that order.
///
/// Location extraction and classification degrade internally instead of
/// failing, so the only hard failures here are invalid input audio and the
/// final insert. The record is written only after every stage has produced
/// a value; there is no partial commit.
pub struct AnalysisService {
    transcriber: Arc<TranscriptionService>,
    locator: Arc<LocationService>,
    classifier: Arc<ClassificationService>,
    records: Arc<RecordService>,
}

impl AnalysisService {
    pub fn new(
        transcriber: Arc<TranscriptionService>,
        locator: Arc<LocationService>,
        classifier: Arc<ClassificationService>,
        records: Arc<RecordService>,
    ) -> Self {
        Self {
            transcriber,
            locator,
            classifier,
            records,
        }
    }

    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisReport, AnalysisError> {
        let transcription = self.transcriber.transcribe(path).await?;

        let location = self.locator.extract_location(&transcription.text).await;

        let classification = self.classifier.analyze(&transcription.text).await;

        let record = PollutionRecord {
            transcription: transcription.text.clone(),
            recognition_service: transcription.service.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            address: location.address.clone(),
            pollution_type: classification.pollution_type.clone(),
            recommendation: classification.recommendation.clone(),
            responsible_agency: classification.responsible_agency.clone(),
            severity_level: classification.severity_level.clone(),
            immediate_actions: classification.immediate_actions.clone(),
            long_term_solution: classification.long_term_solution.clone(),
            raw_response: classification.raw_response.clone(),
            created_at: Utc::now(),
        };

        let record_id = self.records.add(&record).await?;

        tracing::info!(
            record_id,
            service = %transcription.service,
            pollution_type = %classification.pollution_type,
            confidence = location.confidence.as_str(),
            "Analysis completed"
        );

        Ok(AnalysisReport {
            transcription: transcription.text,
            recognition_service: transcription.service,
            location,
            classification,
            record_id,
        })
    }
}
