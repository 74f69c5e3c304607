//! Hugging Face Inference API client for zero-shot classification and
//! token NER.

use serde::{Deserialize, Serialize};
use serde_json::json;

const API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Zero-shot classification model for resource/intent scoring
pub const ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";
/// General-purpose tagger for person/location/organization spans
pub const GENERAL_NER_MODEL: &str = "dslim/bert-base-NER";
/// Domain tagger for disease spans (emits LABEL_0/LABEL_1/LABEL_2)
pub const DISEASE_NER_MODEL: &str = "sarahmiller137/distilbert-base-uncased-ft-ncbi-disease";

/// Client for hosted model inference
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    api_token: String,
}

/// A tagged span returned by a token-classification model
#[derive(Debug, Clone, Deserialize)]
pub struct NerSpan {
    pub entity_group: String,
    pub word: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

impl InferenceClient {
    /// Create a new client with the given API token
    pub fn new(api_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_token,
        }
    }

    /// Score `text` against candidate labels, returning (label, score)
    /// pairs in the model's ranking order
    pub async fn zero_shot(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<(String, f64)>, String> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let response = self
            .post(ZERO_SHOT_MODEL, &serde_json::to_value(&request).unwrap_or_default())
            .await?;

        let parsed: ZeroShotResponse = serde_json::from_value(response)
            .map_err(|e| format!("Failed to parse classification response: {e}"))?;

        Ok(parsed.labels.into_iter().zip(parsed.scores).collect())
    }

    /// Tag `text` with the given token-classification model, returning
    /// aggregated spans with character offsets
    pub async fn token_ner(&self, model: &str, text: &str) -> Result<Vec<NerSpan>, String> {
        let body = json!({
            "inputs": text,
            "parameters": {"aggregation_strategy": "simple"},
        });

        let response = self.post(model, &body).await?;

        serde_json::from_value(response).map_err(|e| format!("Failed to parse NER response: {e}"))
    }

    async fn post(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let response = self
            .http
            .post(format!("{API_BASE}/{model}"))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Inference API error ({status}): {body}"));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {e}"))
    }
}
