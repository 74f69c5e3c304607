//! Dispatch facade: classification + extraction + the core engine.

use nlq_core::RequestDescriptor;

use crate::error::AppError;
use crate::nlp::{EntityPipeline, InferenceClient, QueryClassifier, ResourceKind};

/// Turns one free-text query into one outbound request descriptor.
pub struct Dispatcher {
    classifier: QueryClassifier,
    pipeline: EntityPipeline,
}

impl Dispatcher {
    /// Build a dispatcher; remote models are used when a client is
    /// given, rule patterns and lexical scoring otherwise.
    pub fn new(client: Option<InferenceClient>) -> Self {
        Self {
            classifier: QueryClassifier::new(client.clone()),
            pipeline: EntityPipeline::new(client),
        }
    }

    /// Classify, extract, resolve, and build.
    pub async fn dispatch(
        &self,
        query: &str,
        base_url: &str,
    ) -> Result<RequestDescriptor, AppError> {
        let (resource, intent) = self.classifier.classify(query).await?;
        if resource == ResourceKind::Unsupported {
            return Err(AppError::UnsupportedResource("others".to_string()));
        }

        let entities = self.pipeline.extract(query).await?;
        tracing::debug!(count = entities.len(), intent = %intent, "Entities extracted");

        let request = nlq_core::dispatch(intent, &entities, base_url)?;
        tracing::info!(method = %request.method, url = %request.url, "Generated request");
        Ok(request)
    }
}
