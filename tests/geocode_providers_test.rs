use std::time::Duration;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use ecoreport::application::ports::{GeocodeProvider, GeocodeProviderError};
use ecoreport::infrastructure::geocode::{ArcGisProvider, NominatimProvider, PhotonProvider};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_mock_server(
    route: &'static str,
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        route,
        get(move || async move {
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

#[tokio::test]
async fn given_nominatim_result_when_geocoding_then_string_coordinates_parse() {
    let body = r#"[{"lat": "40.7128", "lon": "-74.0060", "display_name": "New York, NY, USA"}]"#;
    let (base_url, shutdown_tx) = start_mock_server("/search", 200, body).await;

    let provider = NominatimProvider::new(Some(base_url), "ecoreport-test", TIMEOUT);
    let place = provider.geocode("New York").await.unwrap().unwrap();

    assert!((place.latitude - 40.7128).abs() < 1e-9);
    assert!((place.longitude + 74.0060).abs() < 1e-9);
    assert_eq!(place.address, "New York, NY, USA");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_nominatim_finds_nothing_when_geocoding_then_none() {
    let (base_url, shutdown_tx) = start_mock_server("/search", 200, "[]").await;

    let provider = NominatimProvider::new(Some(base_url), "ecoreport-test", TIMEOUT);
    let result = provider.geocode("nowhere at all").await.unwrap();

    assert!(result.is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_nominatim_unparseable_coordinates_when_geocoding_then_none_not_error() {
    let body = r#"[{"lat": "not-a-number", "lon": "-74.0", "display_name": "Broken"}]"#;
    let (base_url, shutdown_tx) = start_mock_server("/search", 200, body).await;

    let provider = NominatimProvider::new(Some(base_url), "ecoreport-test", TIMEOUT);
    let result = provider.geocode("broken").await.unwrap();

    assert!(result.is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_nominatim_server_error_when_geocoding_then_api_request_failed() {
    let (base_url, shutdown_tx) = start_mock_server("/search", 503, "unavailable").await;

    let provider = NominatimProvider::new(Some(base_url), "ecoreport-test", TIMEOUT);
    let result = provider.geocode("anywhere").await;

    assert!(matches!(result, Err(GeocodeProviderError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_arcgis_candidate_when_geocoding_then_xy_mapped_to_lon_lat() {
    let body = r#"{"candidates": [{"address": "Los Angeles, CA", "location": {"x": -118.24, "y": 34.05}}]}"#;
    let (base_url, shutdown_tx) = start_mock_server(
        "/arcgis/rest/services/World/GeocodeServer/findAddressCandidates",
        200,
        body,
    )
    .await;

    let provider = ArcGisProvider::new(Some(base_url), TIMEOUT);
    let place = provider.geocode("Los Angeles").await.unwrap().unwrap();

    assert!((place.latitude - 34.05).abs() < 1e-9);
    assert!((place.longitude + 118.24).abs() < 1e-9);
    assert_eq!(place.address, "Los Angeles, CA");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_arcgis_no_candidates_when_geocoding_then_none() {
    let (base_url, shutdown_tx) = start_mock_server(
        "/arcgis/rest/services/World/GeocodeServer/findAddressCandidates",
        200,
        r#"{"candidates": []}"#,
    )
    .await;

    let provider = ArcGisProvider::new(Some(base_url), TIMEOUT);
    let result = provider.geocode("nowhere").await.unwrap();

    assert!(result.is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_photon_feature_when_geocoding_then_geojson_order_respected() {
    let body = r#"{"features": [{"geometry": {"coordinates": [-74.0060, 40.7128]},
        "properties": {"name": "New York", "city": null, "state": "New York", "country": "USA"}}]}"#;
    let (base_url, shutdown_tx) = start_mock_server("/api", 200, body).await;

    let provider = PhotonProvider::new(Some(base_url), TIMEOUT);
    let place = provider.geocode("New York").await.unwrap().unwrap();

    assert!((place.latitude - 40.7128).abs() < 1e-9);
    assert!((place.longitude + 74.0060).abs() < 1e-9);
    assert!(place.address.contains("New York"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_photon_no_features_when_geocoding_then_none() {
    let (base_url, shutdown_tx) = start_mock_server("/api", 200, r#"{"features": []}"#).await;

    let provider = PhotonProvider::new(Some(base_url), TIMEOUT);
    let result = provider.geocode("nowhere").await.unwrap();

    assert!(result.is_none());
    shutdown_tx.send(()).ok();
}
