use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::ports::{GenerationModel, GenerationModelError};
use crate::domain::{responsible_agency_for, Severity, POLLUTION_TYPES};

/// Structured classification of a pollution report.
///
/// `responsible_agency` is always derived from `pollution_type` via the
/// fixed domain mapping, never taken verbatim from the model.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub pollution_type: String,
    pub recommendation: String,
    pub responsible_agency: String,
    pub severity_level: String,
    pub immediate_actions: String,
    pub long_term_solution: String,
    pub raw_response: serde_json::Value,
}

/// Shape requested from the model. The agency field the model emits is
/// deserialized only to be ignored.
#[derive(Debug, Deserialize)]
struct ModelAnalysis {
    pollution_type: Option<String>,
    recommendation: Option<String>,
    #[allow(dead_code)]
    responsible_agency: Option<String>,
    severity_level: Option<String>,
    immediate_actions: Option<String>,
    long_term_solution: Option<String>,
}

/// Classifies transcript text with a language model, degrading to keyword
/// matching on malformed output and to a canned record on provider failure.
pub struct ClassificationService {
    model: Arc<dyn GenerationModel>,
}

impl ClassificationService {
    pub fn new(model: Arc<dyn GenerationModel>) -> Self {
        Self { model }
    }

    /// Analyze a pollution description. Never fails: provider errors yield
    /// a degraded record with severity `unknown` and the error recorded in
    /// `raw_response`.
    pub async fn analyze(&self, text: &str) -> Classification {
        let prompt = build_prompt(text);

        match self.model.generate(&prompt).await {
            Ok(output) => {
                let mut classification = parse_response(&output.text);
                classification.raw_response = json!({
                    "text": output.text,
                    "meta": {
                        "api_version": output.api_version,
                        "model": output.model,
                    },
                });
                classification
            }
            Err(e) => {
                tracing::error!(error = %e, "Classification model unavailable, using fallback");
                fallback_classification(&e)
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"You are an expert environmental analyst. Analyze the following pollution report and provide a structured response.

POLLUTION REPORT:
{text}

Please analyze this report and respond in the following JSON format:

{{
    "pollution_type": "specific pollution category from: {categories}",
    "recommendation": "detailed cleanup and mitigation steps (2-3 sentences)",
    "responsible_agency": "appropriate government agency or department",
    "severity_level": "low/medium/high/critical",
    "immediate_actions": "urgent steps to take (1-2 sentences)",
    "long_term_solution": "preventive measures and long-term remediation"
}}

Focus on:
1. Accurate pollution type classification
2. Practical, actionable recommendations
3. Correct agency identification
4. Public safety considerations

Response:
"#,
        text = text,
        categories = POLLUTION_TYPES.join(", "),
    )
}

/// Parse model output: structured decoding of the first-`{{`-to-last-`}}`
/// substring, falling back to keyword extraction from the raw text.
fn parse_response(response_text: &str) -> Classification {
    if let (Some(start), Some(end)) = (response_text.find('{'), response_text.rfind('}')) {
        if end > start {
            if let Ok(parsed) = serde_json::from_str::<ModelAnalysis>(&response_text[start..=end]) {
                let pollution_type = parsed
                    .pollution_type
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "unknown pollution".to_string());

                let severity_level = parsed
                    .severity_level
                    .as_deref()
                    .and_then(|s| s.parse::<Severity>().ok())
                    .unwrap_or(Severity::Medium);

                return Classification {
                    responsible_agency: responsible_agency_for(&pollution_type).to_string(),
                    pollution_type,
                    recommendation: parsed.recommendation.unwrap_or_else(|| {
                        "Contact local environmental authorities for assessment.".to_string()
                    }),
                    severity_level: severity_level.as_str().to_string(),
                    immediate_actions: parsed.immediate_actions.unwrap_or_else(|| {
                        "Secure the area and report to authorities.".to_string()
                    }),
                    long_term_solution: parsed.long_term_solution.unwrap_or_else(|| {
                        "Regular monitoring and compliance checks.".to_string()
                    }),
                    raw_response: serde_json::Value::Null,
                };
            }
        }
    }

    tracing::warn!("Model response was not valid JSON, extracting by keyword");
    extract_from_text(response_text)
}

/// Keyword fallback: scan the raw text for any recognized category, first
/// match wins.
fn extract_from_text(text: &str) -> Classification {
    let text_lower = text.to_lowercase();
    let pollution_type = POLLUTION_TYPES
        .iter()
        .find(|t| text_lower.contains(**t))
        .copied()
        .unwrap_or("environmental contamination")
        .to_string();

    Classification {
        responsible_agency: responsible_agency_for(&pollution_type).to_string(),
        pollution_type,
        recommendation: "Contact environmental authorities for proper assessment and cleanup procedures."
            .to_string(),
        severity_level: Severity::Medium.as_str().to_string(),
        immediate_actions: "Secure the area and report to local authorities.".to_string(),
        long_term_solution: "Conduct environmental impact assessment and implement remediation plan."
            .to_string(),
        raw_response: serde_json::Value::Null,
    }
}

fn fallback_classification(error: &GenerationModelError) -> Classification {
    Classification {
        pollution_type: "environmental incident".to_string(),
        recommendation:
            "Unable to analyze pollution type due to service error. Contact local environmental authorities immediately."
                .to_string(),
        responsible_agency: responsible_agency_for("environmental incident").to_string(),
        severity_level: Severity::Unknown.as_str().to_string(),
        immediate_actions: "Report to authorities and secure the area.".to_string(),
        long_term_solution: "Follow up with environmental assessment once service is restored."
            .to_string(),
        raw_response: json!({ "error": error.to_string(), "fallback": true }),
    }
}
