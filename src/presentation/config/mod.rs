mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ClassifierSettings, DatabaseSettings, GeocodingSettings, LoggingSettings, ServerSettings,
    Settings, SpeechSettings,
};
