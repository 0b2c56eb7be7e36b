use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ecoreport::application::ports::{GeocodeProvider, GeocodeProviderError, GeocodedPlace};
use ecoreport::application::services::{LocationService, extract_candidates, parse_coordinates};
use ecoreport::domain::Confidence;

struct StaticGeocoder {
    place: Option<GeocodedPlace>,
    calls: AtomicUsize,
}

impl StaticGeocoder {
    fn hit(latitude: f64, longitude: f64, address: &str) -> Self {
        Self {
            place: Some(GeocodedPlace {
                latitude,
                longitude,
                address: address.to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn miss() -> Self {
        Self {
            place: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl GeocodeProvider for StaticGeocoder {
    fn name(&self) -> &str {
        "static"
    }

    async fn geocode(&self, _query: &str) -> Result<Option<GeocodedPlace>, GeocodeProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.place.clone())
    }
}

struct FailingGeocoder;

#[async_trait::async_trait]
impl GeocodeProvider for FailingGeocoder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn geocode(&self, _query: &str) -> Result<Option<GeocodedPlace>, GeocodeProviderError> {
        Err(GeocodeProviderError::ApiRequestFailed("service down".to_string()))
    }
}

fn service(
    primary: Arc<dyn GeocodeProvider>,
    secondaries: Vec<Arc<dyn GeocodeProvider>>,
) -> LocationService {
    LocationService::new(primary, secondaries, Duration::ZERO)
}

#[test]
fn given_street_address_when_extracting_candidates_then_address_is_found() {
    let candidates = extract_candidates("There is an oil spill at 123 Main Street right now");

    assert!(candidates.iter().any(|c| c.contains("123 Main Street")));
}

#[test]
fn given_city_state_text_when_extracting_candidates_then_pair_is_found() {
    let candidates = extract_candidates("Chemical smell reported in Portland, OR yesterday");

    assert!(candidates.iter().any(|c| c.contains("Portland, OR")));
}

#[test]
fn given_many_matches_when_extracting_candidates_then_capped_and_longest_first() {
    let text = "Sewage at 12 Oak Avenue near Riverside Park in Austin, TX by the Colorado River \
                on Highway 71 between the lake and the beach";

    let candidates = extract_candidates(text);

    assert!(candidates.len() <= 5);
    for pair in candidates.windows(2) {
        assert!(pair[0].len() >= pair[1].len());
    }
}

#[test]
fn given_plain_coordinate_pair_when_parsing_then_values_returned() {
    let parsed = parse_coordinates("dumping at 37.7749, -122.4194 near the docks");

    let (lat, lon) = parsed.expect("coordinates should parse");
    assert!((lat - 37.7749).abs() < 1e-9);
    assert!((lon + 122.4194).abs() < 1e-9);
}

#[test]
fn given_labeled_coordinates_when_parsing_then_values_returned() {
    let parsed = parse_coordinates("position lat: 40.7128, lon: -74.0060");

    let (lat, lon) = parsed.expect("labeled coordinates should parse");
    assert!((lat - 40.7128).abs() < 1e-9);
    assert!((lon + 74.0060).abs() < 1e-9);
}

#[test]
fn given_out_of_range_pair_when_parsing_then_rejected() {
    assert!(parse_coordinates("readings were 200.0, 300.0 today").is_none());
}

#[test]
fn given_south_west_decorations_when_parsing_then_signs_applied() {
    let (lat, lon) = parse_coordinates("at 33.86 S, 151.20 E").expect("should parse");
    assert!(lat < 0.0);
    assert!(lon > 0.0);

    let (lat, lon) = parse_coordinates("at 40.7 N, 74.0 W").expect("should parse");
    assert!(lat > 0.0);
    assert!(lon < 0.0);
}

#[tokio::test]
async fn given_literal_coordinates_when_extracting_then_high_confidence_without_geocoding() {
    let primary = Arc::new(StaticGeocoder::hit(0.0, 0.0, "should not be used"));
    let svc = service(primary.clone(), vec![]);

    let result = svc
        .extract_location("illegal dumping at 37.7749, -122.4194")
        .await;

    assert_eq!(result.confidence, Confidence::High);
    assert!(result.has_coordinates());
    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_primary_resolves_when_extracting_then_high_confidence() {
    let primary = Arc::new(StaticGeocoder::hit(40.7128, -74.0060, "New York, NY, USA"));
    let svc = service(primary, vec![Arc::new(StaticGeocoder::miss())]);

    let result = svc
        .extract_location("Oil sheen spotted near Riverside Park this morning")
        .await;

    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.address.as_deref(), Some("New York, NY, USA"));
    assert!(result.has_coordinates());
}

#[tokio::test]
async fn given_only_secondary_resolves_when_extracting_then_medium_confidence() {
    let primary = Arc::new(StaticGeocoder::miss());
    let secondary = Arc::new(StaticGeocoder::hit(34.05, -118.24, "Los Angeles, CA, USA"));
    let svc = service(primary, vec![secondary]);

    let result = svc
        .extract_location("Smog is thick near Griffith Park today")
        .await;

    assert_eq!(result.confidence, Confidence::Medium);
    assert!(result.has_coordinates());
}

#[tokio::test]
async fn given_every_provider_errors_when_extracting_then_failed_confidence() {
    let svc = service(Arc::new(FailingGeocoder), vec![Arc::new(FailingGeocoder)]);

    let result = svc
        .extract_location("Sewage overflow near Lincoln Park reported")
        .await;

    assert_eq!(result.confidence, Confidence::Failed);
    assert!(!result.has_coordinates());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn given_no_location_cues_when_extracting_then_none_confidence() {
    let primary = Arc::new(StaticGeocoder::hit(0.0, 0.0, "unused"));
    let svc = service(primary.clone(), vec![]);

    let result = svc.extract_location("hello world").await;

    assert_eq!(result.confidence, Confidence::None);
    assert!(!result.has_coordinates());
    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_providers_answer_empty_when_extracting_then_none_not_failed() {
    let svc = service(
        Arc::new(StaticGeocoder::miss()),
        vec![Arc::new(StaticGeocoder::miss())],
    );

    let result = svc
        .extract_location("Strange smell near Central Park tonight")
        .await;

    assert_eq!(result.confidence, Confidence::None);
    assert!(result.error.is_none());
}
