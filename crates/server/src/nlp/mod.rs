//! NLP collaborators: classification and entity extraction

pub mod classifier;
pub mod extractor;
pub mod inference;

pub use classifier::{QueryClassifier, ResourceKind};
pub use extractor::{EntityPipeline, RuleExtractor};
pub use inference::InferenceClient;
