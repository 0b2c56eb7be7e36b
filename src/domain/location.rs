use serde::Serialize;

/// How much trust to place in a resolved location.
///
/// `High` means the primary geocoder confirmed a candidate, `Medium` a
/// secondary provider did. `None` means no candidate could be found or
/// resolved, while `Failed` means every geocoding attempt ended in a
/// provider error rather than an empty answer.
///
/// `Error` is reserved for panics or other faults outside the geocoding
/// chain; the current extraction path never produces it (provider failures
/// surface as `Failed`), so callers matching on the tag can treat it like
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    None,
    Failed,
    Error,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::None => "none",
            Confidence::Failed => "failed",
            Confidence::Error => "error",
        }
    }
}

/// Best-effort location extracted from a transcript.
///
/// Latitude and longitude are either both present or both absent.
#[derive(Debug, Clone, Serialize)]
pub struct LocationResult {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocationResult {
    /// The "nothing found" result. Not an error: the transcript simply
    /// carried no usable location cue.
    pub fn none() -> Self {
        Self {
            latitude: None,
            longitude: None,
            address: None,
            confidence: Confidence::None,
            extracted_text: None,
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            latitude: None,
            longitude: None,
            address: None,
            confidence: Confidence::Failed,
            extracted_text: None,
            error: Some(error),
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
