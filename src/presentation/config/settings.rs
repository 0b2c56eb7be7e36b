use serde::Deserialize;

/// Application settings, loaded from `appsettings.{Environment}.toml`
/// overlaid with `APP_`-prefixed environment variables. Every section has
/// defaults so the service can start from environment variables alone.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub speech: SpeechSettings,
    pub geocoding: GeocodingSettings,
    pub classifier: ClassifierSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Scheme selects the backend: postgres:// or sqlite://.
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://pollution_data.db".to_string(),
        }
    }
}

/// Speech provider credentials. A provider whose key is absent is left
/// out of the fallback chain entirely.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SpeechSettings {
    pub google_api_key: Option<String>,
    pub wit_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingSettings {
    pub nominatim_url: Option<String>,
    pub arcgis_url: Option<String>,
    pub photon_url: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Pause between fallback geocoder attempts, to respect rate limits.
    pub retry_pause_ms: u64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            nominatim_url: None,
            arcgis_url: None,
            photon_url: None,
            user_agent: "ecoreport/0.1".to_string(),
            timeout_secs: 10,
            retry_pause_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: "command".to_string(),
            max_tokens: 800,
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}
