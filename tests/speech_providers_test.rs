use axum::Router;
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use ecoreport::application::ports::{SpeechProvider, SpeechProviderError};
use ecoreport::infrastructure::speech::{
    GoogleSpeechProvider, WhisperSpeechProvider, WitSpeechProvider,
};

async fn start_mock_server(
    route: &'static str,
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        route,
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

#[tokio::test]
async fn given_google_returns_transcript_when_recognizing_then_text_is_extracted() {
    let body = concat!(
        "{\"result\":[]}\n",
        "{\"result\":[{\"alternative\":[{\"transcript\":\"oil spill near the river\"}],\"final\":true}],\"result_index\":0}",
    );
    let (base_url, shutdown_tx) =
        start_mock_server("/speech-api/v2/recognize", 200, body).await;

    let provider = GoogleSpeechProvider::new("test-key".to_string(), Some(base_url));
    let result = provider.recognize(b"fake wav").await;

    assert_eq!(result.unwrap(), "oil spill near the river");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_google_finds_no_speech_when_recognizing_then_unintelligible() {
    let (base_url, shutdown_tx) =
        start_mock_server("/speech-api/v2/recognize", 200, "{\"result\":[]}").await;

    let provider = GoogleSpeechProvider::new("test-key".to_string(), Some(base_url));
    let result = provider.recognize(b"silence").await;

    assert!(matches!(result, Err(SpeechProviderError::Unintelligible)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_google_errors_when_recognizing_then_api_request_failed() {
    let (base_url, shutdown_tx) =
        start_mock_server("/speech-api/v2/recognize", 500, "server error").await;

    let provider = GoogleSpeechProvider::new("test-key".to_string(), Some(base_url));
    let result = provider.recognize(b"fake wav").await;

    assert!(matches!(result, Err(SpeechProviderError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_wit_returns_text_when_recognizing_then_text_is_extracted() {
    let body = r#"{"text": "sewage overflow on main street"}"#;
    let (base_url, shutdown_tx) = start_mock_server("/speech", 200, body).await;

    let provider = WitSpeechProvider::new("wit-token".to_string(), Some(base_url));
    let result = provider.recognize(b"fake wav").await;

    assert_eq!(result.unwrap(), "sewage overflow on main street");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_wit_streams_chunks_when_recognizing_then_last_chunk_wins() {
    let body = "{\"text\": \"sewage\"}\r\n{\"text\": \"sewage overflow on main street\"}";
    let (base_url, shutdown_tx) = start_mock_server("/speech", 200, body).await;

    let provider = WitSpeechProvider::new("wit-token".to_string(), Some(base_url));
    let result = provider.recognize(b"fake wav").await;

    assert_eq!(result.unwrap(), "sewage overflow on main street");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_wit_without_credentials_when_recognizing_then_missing_credentials() {
    let provider = WitSpeechProvider::new(String::new(), None);

    let result = provider.recognize(b"fake wav").await;

    assert!(matches!(result, Err(SpeechProviderError::MissingCredentials(_))));
}

#[tokio::test]
async fn given_whisper_returns_plain_text_when_recognizing_then_text_is_trimmed() {
    let (base_url, shutdown_tx) =
        start_mock_server("/audio/transcriptions", 200, "  black smoke from the factory \n").await;

    let provider = WhisperSpeechProvider::new("sk-test".to_string(), Some(base_url), None);
    let result = provider.recognize(b"fake wav").await;

    assert_eq!(result.unwrap(), "black smoke from the factory");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_whisper_errors_when_recognizing_then_api_request_failed() {
    let (base_url, shutdown_tx) =
        start_mock_server("/audio/transcriptions", 401, "{\"error\": \"bad key\"}").await;

    let provider = WhisperSpeechProvider::new("sk-test".to_string(), Some(base_url), None);
    let result = provider.recognize(b"fake wav").await;

    assert!(matches!(result, Err(SpeechProviderError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}
