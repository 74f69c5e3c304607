//! nlq-core: deterministic resolution of extracted entities into
//! FHIR-style request payloads.
//!
//! Given a declared intent and a bag of possibly-overlapping, unordered
//! tagged spans, the engine resolves a single consistent patient record
//! and serializes it into a search, create, or update request. Pure and
//! synchronous; classification, entity tagging, and the outbound call
//! live with the caller.

pub mod condition;
pub mod entity;
pub mod error;
pub mod normalize;
pub mod record;
pub mod request;
pub mod resolver;

pub use entity::{Entity, EntityLabel};
pub use error::EngineError;
pub use record::{Field, FieldValue, PatientRecord};
pub use request::{Intent, Method, RequestDescriptor};

/// Resource collection all generated requests target.
pub const RESOURCE: &str = "Patient";

/// Resolve entities and build the request for the declared intent.
///
/// The entity list is processed in the order given — the engine never
/// resorts it. An empty list is a recoverable error, as are unsupported
/// intents and an update without an identifier; nothing here panics on
/// well-typed input.
pub fn dispatch(
    intent: Intent,
    entities: &[Entity],
    base_url: &str,
) -> Result<RequestDescriptor, EngineError> {
    if entities.is_empty() {
        return Err(EngineError::NoEntities { resource: RESOURCE });
    }
    let record = resolver::resolve(entities);
    request::build(intent, &record, base_url)
}
