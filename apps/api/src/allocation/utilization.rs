//! Utilization Calculator: per-shelf occupancy, free width and status band.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::config::SpaceAllocationConfig;
use crate::allocation::gaps::{detect_gaps, Gap};
use crate::allocation::geometry::{
    classify_status, occupied_width, utilization_percentage, ShelfStatus,
};
use crate::models::planogram::{ProductSlot, Shelf};

/// Utilization record for a single shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfUtilization {
    pub shelf_id: String,
    pub shelf_level: i32,
    pub total_width: f64,
    pub used_width: f64,
    /// `max(0, total_width - used_width)`.
    pub available_width: f64,
    pub percentage: f64,
    pub status: ShelfStatus,
    pub gaps: Vec<Gap>,
}

/// Computes the utilization record for `shelf` from the slots placed on it.
///
/// `slots` is expected to already be filtered to this shelf. Never fails: a
/// shelf without slots is 0% with one full-width gap, and a zero-width (or
/// negative-width) shelf is 0% with no gaps.
pub fn calculate_shelf_utilization<S: Borrow<ProductSlot>>(
    shelf: &Shelf,
    slots: &[S],
    config: &SpaceAllocationConfig,
) -> ShelfUtilization {
    let total_width = shelf.usable_width();
    let used_width: f64 = slots
        .iter()
        .map(|s| occupied_width(s.borrow(), config.default_product_width))
        .sum();
    let available_width = (total_width - used_width).max(0.0);
    let percentage = utilization_percentage(used_width, total_width);
    let status = classify_status(percentage, config);
    let gaps = detect_gaps(shelf, slots, config);

    debug!(
        shelf_id = %shelf.id,
        used_width,
        total_width,
        percentage,
        ?status,
        gaps = gaps.len(),
        "Shelf utilization computed"
    );

    ShelfUtilization {
        shelf_id: shelf.id.clone(),
        shelf_level: shelf.level,
        total_width,
        used_width,
        available_width,
        percentage,
        status,
        gaps,
    }
}
