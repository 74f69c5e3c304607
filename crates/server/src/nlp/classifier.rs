//! Resource and intent classification over candidate label phrases.
//!
//! Remote zero-shot scoring when an inference token is configured; a
//! deterministic lexical fallback otherwise, so the pipeline works
//! offline.

use nlq_core::Intent;

use super::inference::InferenceClient;
use crate::error::AppError;

/// Resource category a query addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Patient,
    /// Classified as something this server has no handler for
    Unsupported,
}

/// Candidate phrases for resource classification
const RESOURCE_CANDIDATES: [(&str, ResourceKind); 3] = [
    ("medical conditions", ResourceKind::Patient),
    ("patients information", ResourceKind::Patient),
    ("others", ResourceKind::Unsupported),
];

/// Candidate phrases for request-intent classification
const REQUEST_CANDIDATES: [(&str, Intent); 6] = [
    ("search for existing patients", Intent::Search),
    ("find existing records", Intent::Search),
    ("create new patient record", Intent::Create),
    ("update existing data", Intent::Update),
    ("query patient database", Intent::Search),
    ("delete patient record", Intent::Delete),
];

/// Classifies queries into a resource category and request intent
#[derive(Clone)]
pub struct QueryClassifier {
    client: Option<InferenceClient>,
}

impl QueryClassifier {
    pub fn new(client: Option<InferenceClient>) -> Self {
        Self { client }
    }

    /// Classify a query; the arg-max candidate wins on both axes.
    pub async fn classify(&self, prompt: &str) -> Result<(ResourceKind, Intent), AppError> {
        let resource_labels: Vec<&str> = RESOURCE_CANDIDATES.iter().map(|(l, _)| *l).collect();
        let request_labels: Vec<&str> = REQUEST_CANDIDATES.iter().map(|(l, _)| *l).collect();

        let resource_scores = self.scores(prompt, &resource_labels).await?;
        let request_scores = self.scores(prompt, &request_labels).await?;

        let resource_label = arg_max(&resource_scores);
        let request_label = arg_max(&request_scores);

        tracing::debug!(
            resource = resource_label,
            request = request_label,
            "Classified query"
        );

        let resource = RESOURCE_CANDIDATES
            .iter()
            .find(|(l, _)| *l == resource_label)
            .map(|(_, kind)| *kind)
            .unwrap_or(ResourceKind::Unsupported);
        let intent = REQUEST_CANDIDATES
            .iter()
            .find(|(l, _)| *l == request_label)
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::Search);

        Ok((resource, intent))
    }

    async fn scores(&self, prompt: &str, labels: &[&str]) -> Result<Vec<(String, f64)>, AppError> {
        match &self.client {
            Some(client) => client
                .zero_shot(prompt, labels)
                .await
                .map_err(AppError::Inference),
            None => Ok(lexical_scores(prompt, labels)),
        }
    }
}

/// First candidate with the highest score wins, mirroring the remote
/// classifier's arg-max pick.
fn arg_max(scores: &[(String, f64)]) -> &str {
    let mut best: Option<(&str, f64)> = None;
    for (label, score) in scores {
        if best.is_none_or(|(_, top)| *score > top) {
            best = Some((label.as_str(), *score));
        }
    }
    best.map(|(label, _)| label).unwrap_or_default()
}

/// Deterministic fallback scoring: token overlap with the candidate
/// phrase, plus a bonus when the candidate's leading verb appears in
/// the query.
pub fn lexical_scores(prompt: &str, candidate_labels: &[&str]) -> Vec<(String, f64)> {
    let prompt_tokens: Vec<String> = tokenize(prompt);

    candidate_labels
        .iter()
        .map(|label| {
            let label_tokens = tokenize(label);
            let overlap = label_tokens
                .iter()
                .filter(|t| prompt_tokens.contains(*t))
                .count();
            let mut score = overlap as f64 / label_tokens.len().max(1) as f64;
            if let Some(verb) = label_tokens.first() {
                if prompt_tokens.contains(verb) {
                    score += 1.0;
                }
            }
            (label.to_string(), score)
        })
        .collect()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn classify_offline(prompt: &str) -> (ResourceKind, Intent) {
        QueryClassifier::new(None).classify(prompt).await.unwrap()
    }

    #[tokio::test]
    async fn test_search_queries() {
        let (resource, intent) = classify_offline("Show me patients over 50 with diabetes").await;
        assert_eq!(resource, ResourceKind::Patient);
        assert_eq!(intent, Intent::Search);

        let (_, intent) = classify_offline("Find all female patients born after 1990.").await;
        assert_eq!(intent, Intent::Search);
    }

    #[tokio::test]
    async fn test_create_query() {
        let (_, intent) = classify_offline("Create a new patient record for John Doe").await;
        assert_eq!(intent, Intent::Create);
    }

    #[tokio::test]
    async fn test_update_query() {
        let (_, intent) = classify_offline("Update the record of patient with ID 1733722").await;
        assert_eq!(intent, Intent::Update);
    }

    #[tokio::test]
    async fn test_delete_query() {
        let (_, intent) = classify_offline("Delete the patient record for Jane").await;
        assert_eq!(intent, Intent::Delete);
    }

    #[test]
    fn test_arg_max_prefers_first_on_tie() {
        let scores = vec![("a".to_string(), 0.5), ("b".to_string(), 0.5)];
        assert_eq!(arg_max(&scores), "a");
    }

    #[test]
    fn test_lexical_scores_leading_verb_bonus() {
        let scores = lexical_scores(
            "Update the patient record",
            &["create new patient record", "update existing data"],
        );
        assert!(scores[1].1 > scores[0].1);
    }
}
