use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::Value;

use crate::application::services::AnalysisError;
use crate::application::services::TranscriptionError;
use crate::domain::LocationResult;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub transcription: String,
    pub recognition_service: String,
    pub location: LocationResult,
    pub pollution_type: String,
    pub recommendation: String,
    pub responsible_agency: String,
    pub severity_level: String,
    pub raw_cohere_response: Value,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(message: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state, multipart))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Analyze request with no file");
            return bad_request("No file uploaded");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return bad_request(format!("Failed to read multipart: {}", e));
        }
    };

    let filename = field.file_name().unwrap_or("unknown").to_string();
    if !filename.to_lowercase().ends_with(".wav") {
        tracing::warn!(filename = %filename, "Rejected non-wav upload");
        return bad_request("Only .wav files are supported");
    }

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read upload body");
            return bad_request(format!("Failed to read upload: {}", e));
        }
    };

    tracing::debug!(filename = %filename, size = data.len(), "Processing audio upload");

    // The upload lives on disk only for the duration of the pipeline run.
    let temp = match tempfile::Builder::new()
        .prefix("ecoreport-upload-")
        .suffix(".wav")
        .tempfile()
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create temp file");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to stage upload: {}", e),
                }),
            )
                .into_response();
        }
    };

    if let Err(e) = tokio::fs::write(temp.path(), &data).await {
        tracing::error!(error = %e, "Failed to write upload to disk");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to stage upload: {}", e),
            }),
        )
            .into_response();
    }

    match state.analysis_service.analyze_file(temp.path()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                transcription: report.transcription,
                recognition_service: report.recognition_service,
                location: report.location,
                pollution_type: report.classification.pollution_type,
                recommendation: report.classification.recommendation,
                responsible_agency: report.classification.responsible_agency,
                severity_level: report.classification.severity_level,
                raw_cohere_response: report.classification.raw_response,
            }),
        )
            .into_response(),
        Err(AnalysisError::Transcription(
            e @ (TranscriptionError::FileNotFound(_) | TranscriptionError::UnsupportedFormat { .. }),
        )) => {
            tracing::warn!(error = %e, "Invalid analyze input");
            bad_request(e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
