//! Overlap Detector: pairs of slots on one shelf whose intervals intersect.
//!
//! Sweep over slots sorted by `position_x`: an active list holds the slots
//! whose end lies beyond the current start, and every active slot overlaps
//! the incoming one. O(n log n + k) for k reported pairs, reporting exactly
//! the pairs a full pairwise half-open test would.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::config::SpaceAllocationConfig;
use crate::allocation::geometry::{ordered_slots, Interval};
use crate::models::planogram::ProductSlot;

/// Two slots sharing physical space. `first_product_id` belongs to the slot
/// that appears earlier in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapPair {
    pub first_product_id: String,
    pub second_product_id: String,
    /// Shared span `[overlap_start, overlap_end)`.
    pub overlap_start: f64,
    pub overlap_end: f64,
    #[serde(skip)]
    pub first_index: usize,
    #[serde(skip)]
    pub second_index: usize,
}

impl OverlapPair {
    pub fn overlap_width(&self) -> f64 {
        self.overlap_end - self.overlap_start
    }
}

/// Finds every intersecting pair among `slots`, each reported once, ordered by
/// input position of the pair. Returns nothing when `allow_overlap` is set.
pub fn detect_overlaps<S: Borrow<ProductSlot>>(
    slots: &[S],
    config: &SpaceAllocationConfig,
) -> Vec<OverlapPair> {
    if config.allow_overlap {
        return Vec::new();
    }

    let ordered = ordered_slots(slots, config.default_product_width);
    let mut active: Vec<(usize, &ProductSlot, Interval)> = Vec::with_capacity(ordered.len());
    let mut pairs = Vec::new();

    for (index, slot, interval) in ordered {
        active.retain(|(_, _, a)| a.end_x > interval.start_x);
        for (other_index, other, other_interval) in &active {
            if other_interval.intersects(&interval) {
                pairs.push(make_pair(
                    (*other_index, *other, other_interval),
                    (index, slot, &interval),
                ));
            }
        }
        active.push((index, slot, interval));
    }

    pairs.sort_by_key(|p| (p.first_index, p.second_index));

    if !pairs.is_empty() {
        debug!(slots = slots.len(), overlaps = pairs.len(), "Overlaps detected");
    }
    pairs
}

fn make_pair(
    a: (usize, &ProductSlot, &Interval),
    b: (usize, &ProductSlot, &Interval),
) -> OverlapPair {
    let (first, second) = if a.0 <= b.0 { (a, b) } else { (b, a) };
    OverlapPair {
        first_product_id: first.1.product_id.clone(),
        second_product_id: second.1.product_id.clone(),
        overlap_start: first.2.start_x.max(second.2.start_x),
        overlap_end: first.2.end_x.min(second.2.end_x),
        first_index: first.0,
        second_index: second.0,
    }
}
