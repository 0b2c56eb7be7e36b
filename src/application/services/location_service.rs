use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use crate::application::ports::{GeocodeProvider, GeocodedPlace};
use crate::domain::{Confidence, LocationResult};

/// Upper bound on candidates handed to the geocoders per transcript.
const MAX_CANDIDATES: usize = 5;

/// Candidates shorter than this are discarded as noise.
const MIN_CANDIDATE_LEN: usize = 4;

/// Ordered battery of location-shaped text patterns. Longest, most
/// specific matches are preferred downstream, so order here only affects
/// candidate generation, not ranking.
static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Street addresses
        r"(?i)\b\d+\s+[A-Za-z ]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln)\b",
        // Intersections
        r"(?i)\b[A-Za-z ]+\s+(?:and|&)\s+[A-Za-z ]+(?:Street|St|Avenue|Ave|Road|Rd)\b",
        // Near landmarks
        r"(?i)\bnear\s+[A-Za-z ]+(?:Park|School|Hospital|Mall|Center|Plaza)\b",
        // City, State
        r"\b[A-Za-z][A-Za-z ]+,\s*[A-Z]{2}\b",
        // Named water bodies
        r"\b[A-Z][a-z]+(?: [A-Z][a-z]+)*\s+(?:River|Lake|Creek|Bay|Harbor)\b",
        // Coordinate pairs
        r"-?\d+\.?\d*\s*,\s*-?\d+\.?\d*",
        // Zip-coded addresses
        r"(?i)\b[A-Za-z ]+\s+\d{5}(?:-\d{4})?\b",
        // Highway references
        r"(?i)\b(?:highway|hwy|interstate|route|us|i)[- ]?\d+\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CITY_STATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z][A-Za-z ]+,\s*[A-Z]{2}\b").unwrap());

static LANDMARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bnear\s+[A-Za-z ]+(?:Park|School|Hospital|Mall|Center|Plaza)\b").unwrap()
});

static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:the|a|an)\s+").unwrap());

/// Plain "lat, lon" pairs, optionally decorated with N/S/E/W.
static COORD_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-?\d+\.?\d*)\s*°?\s*([NS])?\s*,\s*(-?\d+\.?\d*)\s*°?\s*([EW])?").unwrap()
});

/// Labeled coordinates such as "lat: 37.77 lon: -122.41".
static COORD_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)lat(?:itude)?\s*[:=]\s*(-?\d+\.?\d*)\s*[,;]?\s*lon(?:gitude)?\s*[:=]\s*(-?\d+\.?\d*)")
        .unwrap()
});

/// Words whose trailing text often names a place.
const LOCATION_KEYWORDS: [&str; 18] = [
    "located",
    "at",
    "near",
    "on",
    "by",
    "beside",
    "next to",
    "intersection",
    "corner",
    "between",
    "behind",
    "front of",
    "park",
    "river",
    "lake",
    "beach",
    "highway",
    "freeway",
];

/// Scans free text for location-like substrings and geocodes them against
/// a primary provider and a fixed sequence of secondaries.
pub struct LocationService {
    primary: Arc<dyn GeocodeProvider>,
    secondaries: Vec<Arc<dyn GeocodeProvider>>,
    retry_pause: Duration,
}

struct CandidateOutcome {
    place: Option<(GeocodedPlace, Confidence)>,
    attempts: usize,
    errors: usize,
    last_error: Option<String>,
}

impl LocationService {
    pub fn new(
        primary: Arc<dyn GeocodeProvider>,
        secondaries: Vec<Arc<dyn GeocodeProvider>>,
        retry_pause: Duration,
    ) -> Self {
        Self {
            primary,
            secondaries,
            retry_pause,
        }
    }

    /// Extract a best-effort location from `text`.
    ///
    /// Never fails: "nothing found" is a result with `Confidence::None`,
    /// and "every geocoding call errored" one with `Confidence::Failed`.
    /// A literal coordinate pair in the text short-circuits geocoding.
    pub async fn extract_location(&self, text: &str) -> LocationResult {
        if let Some((latitude, longitude)) = parse_coordinates(text) {
            tracing::debug!(latitude, longitude, "Literal coordinates found in text");
            return LocationResult {
                latitude: Some(latitude),
                longitude: Some(longitude),
                address: None,
                confidence: Confidence::High,
                extracted_text: Some(format!("{}, {}", latitude, longitude)),
                error: None,
            };
        }

        let candidates = extract_candidates(text);
        if candidates.is_empty() {
            tracing::debug!("No location candidates in transcript");
            return LocationResult::none();
        }

        tracing::debug!(count = candidates.len(), "Geocoding location candidates");

        let mut attempts = 0;
        let mut errors = 0;
        let mut last_error = None;

        for candidate in &candidates {
            let outcome = self.geocode_candidate(candidate).await;
            attempts += outcome.attempts;
            errors += outcome.errors;
            if outcome.last_error.is_some() {
                last_error = outcome.last_error;
            }
            if let Some((place, confidence)) = outcome.place {
                return resolved(place, confidence, candidate.clone());
            }
        }

        // Specialized passes as extra candidate sources before giving up.
        let tried: HashSet<&str> = candidates.iter().map(|c| c.as_str()).collect();
        for pattern in [&*CITY_STATE_PATTERN, &*LANDMARK_PATTERN] {
            for m in pattern.find_iter(text) {
                let extra = m.as_str().trim();
                if extra.len() < MIN_CANDIDATE_LEN || tried.contains(extra) {
                    continue;
                }
                let outcome = self.geocode_candidate(extra).await;
                attempts += outcome.attempts;
                errors += outcome.errors;
                if outcome.last_error.is_some() {
                    last_error = outcome.last_error;
                }
                if let Some((place, confidence)) = outcome.place {
                    return resolved(place, confidence, extra.to_string());
                }
            }
        }

        if attempts > 0 && errors == attempts {
            tracing::warn!(attempts, "Every geocoding attempt errored");
            return LocationResult::failed(
                last_error.unwrap_or_else(|| "all geocoding providers failed".to_string()),
            );
        }

        LocationResult::none()
    }

    /// Geocode one candidate: primary provider first (high confidence),
    /// then the secondaries in fixed order (medium), pausing between
    /// attempts to respect provider rate limits.
    async fn geocode_candidate(&self, candidate: &str) -> CandidateOutcome {
        let mut outcome = CandidateOutcome {
            place: None,
            attempts: 0,
            errors: 0,
            last_error: None,
        };

        outcome.attempts += 1;
        match self.primary.geocode(candidate).await {
            Ok(Some(place)) => {
                outcome.place = Some((place, Confidence::High));
                return outcome;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(provider = self.primary.name(), candidate, error = %e, "Geocoding failed");
                outcome.errors += 1;
                outcome.last_error = Some(e.to_string());
            }
        }

        for provider in &self.secondaries {
            tokio::time::sleep(self.retry_pause).await;
            outcome.attempts += 1;
            match provider.geocode(candidate).await {
                Ok(Some(place)) => {
                    outcome.place = Some((place, Confidence::Medium));
                    return outcome;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(provider = provider.name(), candidate, error = %e, "Geocoding failed");
                    outcome.errors += 1;
                    outcome.last_error = Some(e.to_string());
                }
            }
        }

        outcome
    }
}

fn resolved(place: GeocodedPlace, confidence: Confidence, extracted: String) -> LocationResult {
    tracing::info!(
        latitude = place.latitude,
        longitude = place.longitude,
        confidence = confidence.as_str(),
        "Location resolved"
    );
    LocationResult {
        latitude: Some(place.latitude),
        longitude: Some(place.longitude),
        address: Some(place.address),
        confidence,
        extracted_text: Some(extracted),
        error: None,
    }
}

/// Generate location candidates from text: pattern battery plus the
/// keyword-anchored sentence heuristic, deduplicated, ordered longest
/// first and capped.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let text = text.trim();
    let mut candidates: Vec<String> = Vec::new();

    for pattern in LOCATION_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            candidates.push(m.as_str().trim().to_string());
        }
    }

    for sentence in text.split(['.', '!', '?']) {
        let sentence = sentence.trim().to_lowercase();
        for keyword in LOCATION_KEYWORDS {
            if let Some(idx) = sentence.find(keyword) {
                let tail = sentence[idx + keyword.len()..].trim();
                let tail = LEADING_ARTICLE.replace(tail, "");
                let collapsed = tail.split_whitespace().collect::<Vec<_>>().join(" ");
                if collapsed.len() >= MIN_CANDIDATE_LEN {
                    candidates.push(collapsed);
                }
            }
        }
    }

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));

    // Longer strings are assumed more specific and tried first.
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));
    candidates.truncate(MAX_CANDIDATES);

    candidates
}

/// Recognize a literal "lat, lon" pair (optionally N/S/E/W-decorated or
/// labeled) and validate its range.
pub fn parse_coordinates(text: &str) -> Option<(f64, f64)> {
    if let Some(caps) = COORD_LABELED.captures(text) {
        let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let lon = caps.get(2)?.as_str().parse::<f64>().ok()?;
        if in_range(lat, lon) {
            return Some((lat, lon));
        }
    }

    for caps in COORD_PAIR.captures_iter(text) {
        let Ok(mut lat) = caps.get(1).map_or("", |m| m.as_str()).parse::<f64>() else {
            continue;
        };
        let Ok(mut lon) = caps.get(3).map_or("", |m| m.as_str()).parse::<f64>() else {
            continue;
        };
        if caps.get(2).is_some_and(|m| m.as_str().eq_ignore_ascii_case("S")) {
            lat = -lat.abs();
        }
        if caps.get(4).is_some_and(|m| m.as_str().eq_ignore_ascii_case("W")) {
            lon = -lon.abs();
        }
        if in_range(lat, lon) {
            return Some((lat, lon));
        }
    }

    None
}

fn in_range(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
