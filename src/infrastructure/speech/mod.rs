mod google_provider;
mod whisper_provider;
mod wit_provider;

pub use google_provider::GoogleSpeechProvider;
pub use whisper_provider::WhisperSpeechProvider;
pub use wit_provider::WitSpeechProvider;
