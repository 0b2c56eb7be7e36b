use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{GeocodeProvider, GeocodeProviderError, GeocodedPlace};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// OpenStreetMap Nominatim forward geocoding. Primary provider: results
/// from it are tagged high confidence.
pub struct NominatimProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimProvider {
    pub fn new(base_url: Option<String>, user_agent: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
        }
    }
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    fn name(&self) -> &str {
        "Nominatim"
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeProviderError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));

        tracing::debug!(query, "Geocoding via Nominatim");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
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

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| GeocodeProviderError::InvalidResponse(format!("parse: {}", e)))?;

        let Some(result) = results.into_iter().next() else {
            return Ok(None);
        };

        // Nominatim serializes coordinates as strings; a value that does
        // not parse means the result is unusable, not that the call failed.
        let (Ok(latitude), Ok(longitude)) =
            (result.lat.parse::<f64>(), result.lon.parse::<f64>())
        else {
            tracing::warn!(lat = %result.lat, lon = %result.lon, "Unparseable Nominatim coordinates");
            return Ok(None);
        };

        Ok(Some(GeocodedPlace {
            latitude,
            longitude,
            address: result.display_name,
        }))
    }
}
