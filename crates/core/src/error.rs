use thiserror::Error;

use crate::request::Intent;

/// Recoverable engine outcomes surfaced as values, never panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("No entities found")]
    NoEntities { resource: &'static str },

    #[error("Unsupported request type: {0}")]
    UnsupportedIntent(Intent),

    #[error("Identifier is required for update")]
    MissingIdentifier,
}

impl EngineError {
    /// Resource name attached to the error, when one applies.
    pub fn resource(&self) -> Option<&'static str> {
        match self {
            EngineError::NoEntities { resource } => Some(resource),
            _ => None,
        }
    }
}
