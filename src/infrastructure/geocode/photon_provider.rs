use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{GeocodeProvider, GeocodeProviderError, GeocodedPlace};

const DEFAULT_BASE_URL: &str = "https://photon.komoot.io";

/// Photon (OSM-backed) geocoding, the second secondary in the chain.
pub struct PhotonProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Deserialize)]
struct PhotonFeature {
    geometry: PhotonGeometry,
    properties: PhotonProperties,
}

#[derive(Deserialize)]
struct PhotonGeometry {
    /// GeoJSON order: [longitude, latitude].
    coordinates: Vec<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PhotonProperties {
    name: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl PhotonProvider {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
        }
    }
}

#[async_trait]
impl GeocodeProvider for PhotonProvider {
    fn name(&self) -> &str {
        "Photon"
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeProviderError> {
        let url = format!("{}/api", self.base_url.trim_end_matches('/'));

        tracing::debug!(query, "Geocoding via Photon");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", "1")])
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

        let parsed: PhotonResponse = response
            .json()
            .await
            .map_err(|e| GeocodeProviderError::InvalidResponse(format!("parse: {}", e)))?;

        let Some(feature) = parsed.features.into_iter().next() else {
            return Ok(None);
        };

        let [longitude, latitude, ..] = feature.geometry.coordinates[..] else {
            return Err(GeocodeProviderError::InvalidResponse(
                "feature without coordinates".to_string(),
            ));
        };

        let address = [
            feature.properties.name,
            feature.properties.city,
            feature.properties.state,
            feature.properties.country,
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        Ok(Some(GeocodedPlace {
            latitude,
            longitude,
            address,
        }))
    }
}
