use thiserror::Error;

/// Caller contract violations. Expected geometric conditions (overlaps,
/// overflow, gaps) are never reported through this type; they come back as
/// data in the validation and placement results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("required width must be positive and finite, got {0}")]
    NonPositiveRequiredWidth(f64),

    #[error("shelf '{shelf_id}' has negative width {width}")]
    NegativeShelfWidth { shelf_id: String, width: f64 },

    #[error("invalid space allocation config: {0}")]
    InvalidConfig(String),
}
