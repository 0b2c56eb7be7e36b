use async_trait::async_trait;

/// Coordinates and formatted address returned by a geocoding backend.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// A forward-geocoding backend.
///
/// `Ok(None)` means the provider answered but found nothing for the query;
/// only transport or contract violations are errors.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeProviderError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
