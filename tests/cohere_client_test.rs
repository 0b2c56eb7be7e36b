use axum::Router;
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use ecoreport::application::ports::{GenerationModel, GenerationModelError};
use ecoreport::infrastructure::llm::CohereClient;

async fn start_mock_cohere(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/v1/generate",
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (
                status,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                response_body,
            )
                .into_response()
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

fn client(base_url: String) -> CohereClient {
    CohereClient::new("test-key".to_string(), Some(base_url), None, 800, 0.3)
}

#[tokio::test]
async fn given_generation_response_when_generating_then_text_and_version_returned() {
    let body = r#"{"generations": [{"text": "{\"pollution_type\": \"oil spill\"}"}],
        "meta": {"api_version": {"version": "2022-12-06"}}}"#;
    let (base_url, shutdown_tx) = start_mock_cohere(200, body).await;

    let output = client(base_url).generate("classify this").await.unwrap();

    assert!(output.text.contains("oil spill"));
    assert_eq!(output.model, "command");
    assert_eq!(output.api_version.as_deref(), Some("2022-12-06"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_rate_limit_status_when_generating_then_rate_limited_error() {
    let (base_url, shutdown_tx) = start_mock_cohere(429, r#"{"message": "slow down"}"#).await;

    let result = client(base_url).generate("classify this").await;

    assert!(matches!(result, Err(GenerationModelError::RateLimited)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_empty_generations_when_generating_then_invalid_response() {
    let (base_url, shutdown_tx) = start_mock_cohere(200, r#"{"generations": []}"#).await;

    let result = client(base_url).generate("classify this").await;

    assert!(matches!(result, Err(GenerationModelError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_generating_then_api_request_failed() {
    let (base_url, shutdown_tx) = start_mock_cohere(500, "internal error").await;

    let result = client(base_url).generate("classify this").await;

    assert!(matches!(result, Err(GenerationModelError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}
