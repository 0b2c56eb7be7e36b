mod audio_converter;
mod generation_model;
mod geocode_provider;
mod record_repository;
mod repository_error;
mod speech_provider;

pub use audio_converter::{AudioConversionError, AudioConverter};
pub use generation_model::{GenerationModel, GenerationModelError, GenerationOutput};
pub use geocode_provider::{GeocodeProvider, GeocodeProviderError, GeocodedPlace};
pub use record_repository::{RecordRepository, Row};
pub use repository_error::RepositoryError;
pub use speech_provider::{SpeechProvider, SpeechProviderError};
