use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use config::Environment as EnvironmentSource;
use config::{Config, File};
use tokio::net::TcpListener;

use ecoreport::application::ports::{GeocodeProvider, SpeechProvider};
use ecoreport::application::services::{
    AnalysisService, ClassificationService, LocationService, RecordService, TranscriptionService,
};
use ecoreport::infrastructure::audio::SymphoniaConverter;
use ecoreport::infrastructure::geocode::{ArcGisProvider, NominatimProvider, PhotonProvider};
use ecoreport::infrastructure::llm::CohereClient;
use ecoreport::infrastructure::observability::{TracingConfig, init_tracing};
use ecoreport::infrastructure::persistence::repository_for_url;
use ecoreport::infrastructure::speech::{
    GoogleSpeechProvider, WhisperSpeechProvider, WitSpeechProvider,
};
use ecoreport::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let configuration = Config::builder()
        .add_source(
            File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
        )
        .add_source(EnvironmentSource::with_prefix("APP").separator("_"))
        .build()?;

    let settings: Settings = configuration.try_deserialize()?;

    init_tracing(
        TracingConfig {
            environment: environment.to_string(),
            json_format: settings.logging.enable_json,
        },
        settings.server.port,
    );

    tracing::info!(environment = %environment, "Starting pollution report service");

    // Speech chain, in priority order. A provider without credentials is
    // left out rather than configured to fail.
    let mut speech_providers: Vec<Arc<dyn SpeechProvider>> = Vec::new();
    speech_providers.push(Arc::new(GoogleSpeechProvider::new(
        settings.speech.google_api_key.clone().unwrap_or_default(),
        None,
    )));
    if let Some(key) = settings.speech.wit_api_key.clone() {
        speech_providers.push(Arc::new(WitSpeechProvider::new(key, None)));
    }
    if let Some(key) = settings.speech.openai_api_key.clone() {
        speech_providers.push(Arc::new(WhisperSpeechProvider::new(key, None, None)));
    }

    let transcription_service = Arc::new(TranscriptionService::new(
        Arc::new(SymphoniaConverter),
        speech_providers,
    ));

    let geo_timeout = Duration::from_secs(settings.geocoding.timeout_secs);
    let primary: Arc<dyn GeocodeProvider> = Arc::new(NominatimProvider::new(
        settings.geocoding.nominatim_url.clone(),
        &settings.geocoding.user_agent,
        geo_timeout,
    ));
    let secondaries: Vec<Arc<dyn GeocodeProvider>> = vec![
        Arc::new(ArcGisProvider::new(
            settings.geocoding.arcgis_url.clone(),
            geo_timeout,
        )),
        Arc::new(PhotonProvider::new(
            settings.geocoding.photon_url.clone(),
            geo_timeout,
        )),
    ];
    let location_service = Arc::new(LocationService::new(
        primary,
        secondaries,
        Duration::from_millis(settings.geocoding.retry_pause_ms),
    ));

    let classification_service = Arc::new(ClassificationService::new(Arc::new(CohereClient::new(
        settings.classifier.api_key.clone(),
        settings.classifier.base_url.clone(),
        Some(settings.classifier.model.clone()),
        settings.classifier.max_tokens,
        settings.classifier.temperature,
    ))));

    let repository = repository_for_url(&settings.database.url)?;
    repository.init_schema().await?;
    let record_service = Arc::new(RecordService::new(repository));

    let analysis_service = Arc::new(AnalysisService::new(
        transcription_service,
        location_service,
        classification_service,
        Arc::clone(&record_service),
    ));

    let host: std::net::IpAddr = settings.server.host.parse()?;
    let addr = SocketAddr::from((host, settings.server.port));

    let state = AppState {
        analysis_service,
        record_service,
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
