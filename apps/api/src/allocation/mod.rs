// Shelf space allocation core.
// Implements: utilization, gap detection, overlap detection, placement and
// optimization advice, and whole-planogram validation.
// Everything except `handlers` is pure and synchronous; handlers run the
// CPU-bound passes inside tokio::task::spawn_blocking.

pub mod config;
pub mod error;
pub mod gaps;
pub mod geometry;
pub mod handlers;
pub mod optimization;
pub mod overlap;
pub mod placement;
pub mod utilization;
pub mod validator;

// Re-export the public API consumed by handlers and the hosting application.
pub use config::SpaceAllocationConfig;
pub use error::AllocationError;
pub use geometry::Interval;
pub use optimization::{generate_optimization_suggestions, OptimizationSuggestion};
pub use placement::{
    auto_adjust_slot_position, can_add_slot, find_available_space, PlacementDecision,
};
pub use utilization::{calculate_shelf_utilization, ShelfUtilization};
pub use validator::{validate, ValidationResult};
