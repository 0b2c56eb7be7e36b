use std::sync::Arc;

use crate::application::services::{AnalysisService, RecordService};

#[derive(Clone)]
pub struct AppState {
    pub analysis_service: Arc<AnalysisService>,
    pub record_service: Arc<RecordService>,
}
