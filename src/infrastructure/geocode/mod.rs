mod arcgis_provider;
mod nominatim_provider;
mod photon_provider;

pub use arcgis_provider::ArcGisProvider;
pub use nominatim_provider::NominatimProvider;
pub use photon_provider::PhotonProvider;
