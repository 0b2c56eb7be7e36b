use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{GeocodeProvider, GeocodeProviderError, GeocodedPlace};

const DEFAULT_BASE_URL: &str = "https://geocode.arcgis.com";

/// ArcGIS World Geocoding Service, used as a secondary (medium
/// confidence) fallback.
pub struct ArcGisProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct FindAddressResponse {
    #[serde(default)]
    candidates: Vec<AddressCandidate>,
}

#[derive(Deserialize)]
struct AddressCandidate {
    address: String,
    location: CandidateLocation,
}

#[derive(Deserialize)]
struct CandidateLocation {
    x: f64,
    y: f64,
}

impl ArcGisProvider {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
        }
    }
}

#[async_trait]
impl GeocodeProvider for ArcGisProvider {
    fn name(&self) -> &str {
        "ArcGIS"
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeProviderError> {
        let url = format!(
            "{}/arcgis/rest/services/World/GeocodeServer/findAddressCandidates",
            self.base_url.trim_end_matches('/')
        );

        tracing::debug!(query, "Geocoding via ArcGIS");

        let response = self
            .client
            .get(&url)
            .query(&[("f", "json"), ("singleLine", query), ("maxLocations", "1")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GeocodeProviderError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(GeocodeProviderError::ApiRequestFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let parsed: FindAddressResponse = response
            .json()
            .await
            .map_err(|e| GeocodeProviderError::InvalidResponse(format!("parse: {}", e)))?;

        Ok(parsed.candidates.into_iter().next().map(|c| GeocodedPlace {
            latitude: c.location.y,
            longitude: c.location.x,
            address: c.address,
        }))
    }
}
