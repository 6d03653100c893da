use barpark_core::types::RecordId;

use crate::simulation::Operation;

/// Failures reported by any backing service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transient failure; the caller may retry.
    #[error("Service unavailable during {0}")]
    Unavailable(Operation),

    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: RecordId },

    /// The write contradicts the canonical state (e.g. joining a full event).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Storage(_))
    }
}
