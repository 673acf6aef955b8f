use crate::allocation::SpaceAllocationConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Default allocation policy for requests that do not carry their own.
    /// Loaded from SPACE_* environment variables at startup.
    pub allocation: SpaceAllocationConfig,
}
