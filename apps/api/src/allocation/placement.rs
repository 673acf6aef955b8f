//! Placement Advisor: first-fit search and add-slot checks for one shelf.
//!
//! All three entry points treat a non-positive required width or a negative
//! shelf width as a caller contract violation and return `AllocationError`.
//! Geometric rejections are data: `PlacementDecision::Rejected`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::allocation::config::SpaceAllocationConfig;
use crate::allocation::error::AllocationError;
use crate::allocation::gaps::free_intervals;
use crate::allocation::geometry::{
    classify_status, fits_within, occupied_width, slot_interval, utilization_percentage,
    Interval, ShelfStatus,
};
use crate::models::planogram::{ProductSlot, Shelf};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// `position_x` is negative.
    NegativePosition,
    /// The slot would run past the end of the shelf.
    ExceedsShelfWidth,
    /// The slot would share space with an existing slot.
    Overlap,
    /// Strict mode and the shelf would be over capacity.
    CapacityExceeded,
}

/// Outcome of `can_add_slot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PlacementDecision {
    Accepted,
    Rejected {
        reason: RejectionReason,
        message: String,
        /// Existing slots the new one would collide with (overlap only).
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        conflicting_product_ids: Vec<String>,
        /// First free interval wide enough for the slot, when one exists.
        suggested_position: Option<Interval>,
    },
}

impl PlacementDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlacementDecision::Accepted)
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            PlacementDecision::Accepted => None,
            PlacementDecision::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub fn suggested_position(&self) -> Option<Interval> {
        match self {
            PlacementDecision::Accepted => None,
            PlacementDecision::Rejected {
                suggested_position, ..
            } => *suggested_position,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// First-fit search: the leftmost free interval at least `required_width`
/// wide, trimmed to exactly `required_width` from its start.
pub fn find_available_space(
    shelf: &Shelf,
    existing_slots: &[ProductSlot],
    required_width: f64,
    config: &SpaceAllocationConfig,
) -> Result<Option<Interval>, AllocationError> {
    check_shelf(shelf)?;
    if !(required_width.is_finite() && required_width > 0.0) {
        warn!(shelf_id = %shelf.id, required_width, "Rejected non-positive required width");
        return Err(AllocationError::NonPositiveRequiredWidth(required_width));
    }

    let found = free_intervals(shelf, existing_slots, config.default_product_width)
        .into_iter()
        .map(|(_, interval)| interval)
        .find(|interval| interval.width >= required_width)
        .map(|interval| Interval::new(interval.start_x, interval.start_x + required_width));

    Ok(found)
}

/// Decides whether `new_slot` can go on `shelf` next to `existing_slots`.
///
/// Checks run in order: negative position, shelf bounds, overlap (skipped
/// when `allow_overlap` is set), then strict-mode capacity. Bounds and
/// overlap rejections carry the first-fit suggestion for the slot's width.
pub fn can_add_slot(
    shelf: &Shelf,
    existing_slots: &[ProductSlot],
    new_slot: &ProductSlot,
    config: &SpaceAllocationConfig,
) -> Result<PlacementDecision, AllocationError> {
    check_shelf(shelf)?;

    let interval = slot_interval(new_slot, config.default_product_width);
    let shelf_width = shelf.usable_width();

    if new_slot.position_x < 0.0 || !new_slot.position_x.is_finite() {
        return Ok(reject(
            new_slot,
            RejectionReason::NegativePosition,
            format!(
                "Position {} is before the start of shelf '{}'",
                new_slot.position_x, shelf.id
            ),
            Vec::new(),
            None,
        ));
    }

    if !fits_within(&interval, shelf_width) {
        let suggested =
            find_available_space(shelf, existing_slots, interval.width, config)?;
        return Ok(reject(
            new_slot,
            RejectionReason::ExceedsShelfWidth,
            format!(
                "Slot ends at {:.1}cm but shelf '{}' is only {:.1}cm wide",
                interval.end_x, shelf.id, shelf_width
            ),
            Vec::new(),
            suggested,
        ));
    }

    if !config.allow_overlap {
        let conflicts: Vec<String> = existing_slots
            .iter()
            .filter(|s| slot_interval(s, config.default_product_width).intersects(&interval))
            .map(|s| s.product_id.clone())
            .collect();

        if !conflicts.is_empty() {
            let suggested =
                find_available_space(shelf, existing_slots, interval.width, config)?;
            return Ok(reject(
                new_slot,
                RejectionReason::Overlap,
                format!(
                    "Slot [{:.1}, {:.1}) overlaps {}",
                    interval.start_x,
                    interval.end_x,
                    conflicts.join(", ")
                ),
                conflicts,
                suggested,
            ));
        }
    }

    if config.strict_mode {
        let used: f64 = existing_slots
            .iter()
            .map(|s| occupied_width(s, config.default_product_width))
            .sum::<f64>()
            + interval.width;
        let percentage = utilization_percentage(used, shelf_width);
        if classify_status(percentage, config) == ShelfStatus::Exceeded {
            return Ok(reject(
                new_slot,
                RejectionReason::CapacityExceeded,
                format!(
                    "Adding the slot would put shelf '{}' at {:.1}% utilization",
                    shelf.id, percentage
                ),
                Vec::new(),
                None,
            ));
        }
    }

    debug!(shelf_id = %shelf.id, product_id = %new_slot.product_id, "Placement accepted");
    Ok(PlacementDecision::Accepted)
}

/// Moves `new_slot` to the start of the first free interval that fits it.
///
/// Does not run `can_add_slot`; callers needing the full check call both.
pub fn auto_adjust_slot_position(
    shelf: &Shelf,
    existing_slots: &[ProductSlot],
    new_slot: &ProductSlot,
    config: &SpaceAllocationConfig,
) -> Result<Option<ProductSlot>, AllocationError> {
    let required = occupied_width(new_slot, config.default_product_width);
    let adjusted = find_available_space(shelf, existing_slots, required, config)?
        .map(|interval| new_slot.moved_to(interval.start_x));
    Ok(adjusted)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn check_shelf(shelf: &Shelf) -> Result<(), AllocationError> {
    if shelf.width < 0.0 {
        warn!(shelf_id = %shelf.id, width = shelf.width, "Rejected negative shelf width");
        return Err(AllocationError::NegativeShelfWidth {
            shelf_id: shelf.id.clone(),
            width: shelf.width,
        });
    }
    Ok(())
}

fn reject(
    new_slot: &ProductSlot,
    reason: RejectionReason,
    message: String,
    conflicting_product_ids: Vec<String>,
    suggested_position: Option<Interval>,
) -> PlacementDecision {
    debug!(product_id = %new_slot.product_id, ?reason, "Placement rejected");
    PlacementDecision::Rejected {
        reason,
        message,
        conflicting_product_ids,
        suggested_position,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_shelf(width: f64) -> Shelf {
        Shelf {
            id: "s1".to_string(),
            level: 1,
            width,
            eye_level: false,
        }
    }

    fn make_slot(id: &str, position_x: f64, width: f64) -> ProductSlot {
        ProductSlot {
            product_id: id.to_string(),
            shelf_id: "s1".to_string(),
            position_x,
            width: Some(width),
            facings: Some(1),
        }
    }

    fn make_config() -> SpaceAllocationConfig {
        SpaceAllocationConfig::default()
    }

    // ── find_available_space ────────────────────────────────────────────────

    #[test]
    fn test_first_fit_prefers_leftmost_gap() {
        let existing = vec![make_slot("a", 10.0, 20.0), make_slot("b", 60.0, 20.0)];
        // free: [0,10) [30,60) [80,100)
        let found = find_available_space(&make_shelf(100.0), &existing, 15.0, &make_config())
            .unwrap()
            .unwrap();
        assert_eq!(found, Interval::new(30.0, 45.0));
    }

    #[test]
    fn test_first_fit_trims_to_required_width() {
        let found = find_available_space(&make_shelf(100.0), &[], 12.5, &make_config())
            .unwrap()
            .unwrap();
        assert_eq!(found.start_x, 0.0);
        assert_eq!(found.width, 12.5);
    }

    #[test]
    fn test_no_gap_wide_enough() {
        let existing = vec![make_slot("a", 0.0, 45.0), make_slot("b", 55.0, 40.0)];
        let found =
            find_available_space(&make_shelf(100.0), &existing, 20.0, &make_config()).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_insignificant_gap_still_usable() {
        let config = SpaceAllocationConfig {
            min_significant_gap_width: 5.0,
            ..make_config()
        };
        let existing = vec![make_slot("a", 0.0, 47.0), make_slot("b", 50.0, 50.0)];
        let found = find_available_space(&make_shelf(100.0), &existing, 3.0, &config)
            .unwrap()
            .unwrap();
        assert_eq!(found, Interval::new(47.0, 50.0));
    }

    #[test]
    fn test_non_positive_required_width_is_contract_violation() {
        let err = find_available_space(&make_shelf(100.0), &[], 0.0, &make_config()).unwrap_err();
        assert_eq!(err, AllocationError::NonPositiveRequiredWidth(0.0));
        assert!(find_available_space(&make_shelf(100.0), &[], -3.0, &make_config()).is_err());
    }

    #[test]
    fn test_negative_shelf_width_is_contract_violation() {
        let err = find_available_space(&make_shelf(-1.0), &[], 5.0, &make_config()).unwrap_err();
        assert!(matches!(err, AllocationError::NegativeShelfWidth { .. }));
    }

    // ── can_add_slot ────────────────────────────────────────────────────────

    #[test]
    fn test_overlap_rejected_with_suggestion() {
        let existing = vec![make_slot("a", 10.0, 30.0)];
        let decision = can_add_slot(
            &make_shelf(100.0),
            &existing,
            &make_slot("b", 20.0, 10.0),
            &make_config(),
        )
        .unwrap();

        assert_eq!(decision.reason(), Some(RejectionReason::Overlap));
        let suggested = decision.suggested_position().unwrap();
        assert!(suggested.width >= 10.0);
        assert!(!suggested.intersects(&Interval::new(10.0, 40.0)));
        assert_eq!(suggested, Interval::new(0.0, 10.0));

        match decision {
            PlacementDecision::Rejected {
                conflicting_product_ids,
                ..
            } => assert_eq!(conflicting_product_ids, vec!["a".to_string()]),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_position_rejected() {
        let decision = can_add_slot(
            &make_shelf(100.0),
            &[],
            &make_slot("a", -1.0, 10.0),
            &make_config(),
        )
        .unwrap();
        assert_eq!(decision.reason(), Some(RejectionReason::NegativePosition));
        assert_eq!(decision.suggested_position(), None);
    }

    #[test]
    fn test_past_shelf_end_rejected_with_suggestion() {
        let existing = vec![make_slot("a", 0.0, 30.0)];
        let decision = can_add_slot(
            &make_shelf(100.0),
            &existing,
            &make_slot("b", 95.0, 10.0),
            &make_config(),
        )
        .unwrap();
        assert_eq!(decision.reason(), Some(RejectionReason::ExceedsShelfWidth));
        assert_eq!(decision.suggested_position(), Some(Interval::new(30.0, 40.0)));
    }

    #[test]
    fn test_slot_ending_exactly_at_shelf_end_accepted() {
        let decision = can_add_slot(
            &make_shelf(100.0),
            &[],
            &make_slot("a", 90.0, 10.0),
            &make_config(),
        )
        .unwrap();
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_fractional_slot_at_shelf_edge_accepted() {
        // 0.1 + 0.2 ends a hair past 0.3 in binary floating point.
        let existing = vec![make_slot("a", 0.0, 0.1)];
        let decision = can_add_slot(
            &make_shelf(0.3),
            &existing,
            &make_slot("b", 0.1, 0.2),
            &make_config(),
        )
        .unwrap();
        assert!(decision.is_accepted(), "{decision:?}");
    }

    #[test]
    fn test_allow_overlap_accepts_overlapping_slot() {
        let config = SpaceAllocationConfig {
            allow_overlap: true,
            ..make_config()
        };
        let existing = vec![make_slot("a", 0.0, 30.0)];
        let decision =
            can_add_slot(&make_shelf(100.0), &existing, &make_slot("b", 10.0, 10.0), &config)
                .unwrap();
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_strict_mode_rejects_over_capacity() {
        // Overlapping draft layout: 90 + 20 = 110% of the shelf.
        let config = SpaceAllocationConfig {
            allow_overlap: true,
            strict_mode: true,
            ..make_config()
        };
        let existing = vec![make_slot("a", 0.0, 90.0)];
        let decision =
            can_add_slot(&make_shelf(100.0), &existing, &make_slot("b", 50.0, 20.0), &config)
                .unwrap();
        assert_eq!(decision.reason(), Some(RejectionReason::CapacityExceeded));

        let lenient = SpaceAllocationConfig {
            strict_mode: false,
            ..config
        };
        let decision =
            can_add_slot(&make_shelf(100.0), &existing, &make_slot("b", 50.0, 20.0), &lenient)
                .unwrap();
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_decision_serializes_with_tag() {
        let json = serde_json::to_value(PlacementDecision::Accepted).unwrap();
        assert_eq!(json["decision"], "accepted");
    }

    // ── auto_adjust_slot_position ───────────────────────────────────────────

    #[test]
    fn test_auto_adjust_moves_to_first_fit() {
        let existing = vec![make_slot("a", 0.0, 25.0)];
        let mut new_slot = make_slot("b", 10.0, 5.0);
        new_slot.facings = Some(2);
        let adjusted =
            auto_adjust_slot_position(&make_shelf(100.0), &existing, &new_slot, &make_config())
                .unwrap()
                .unwrap();
        assert_eq!(adjusted.position_x, 25.0);
        assert_eq!(adjusted.product_id, "b");
        assert_eq!(adjusted.facings, Some(2));
    }

    #[test]
    fn test_auto_adjust_full_shelf_returns_none() {
        let existing = vec![make_slot("a", 0.0, 100.0)];
        let adjusted = auto_adjust_slot_position(
            &make_shelf(100.0),
            &existing,
            &make_slot("b", 0.0, 10.0),
            &make_config(),
        )
        .unwrap();
        assert!(adjusted.is_none());
    }

    proptest! {
        #[test]
        fn first_fit_is_deterministic(
            layout in prop::collection::vec((0u32..20, 1u32..20), 0..6),
            required in 1u32..40,
        ) {
            let mut cursor = 0.0;
            let mut existing = Vec::new();
            for (i, (space, width)) in layout.iter().enumerate() {
                cursor += *space as f64;
                existing.push(make_slot(&format!("p{i}"), cursor, *width as f64));
                cursor += *width as f64;
            }
            let shelf = make_shelf(cursor + 5.0);
            let config = make_config();

            let first = find_available_space(&shelf, &existing, required as f64, &config).unwrap();
            let second = find_available_space(&shelf, &existing, required as f64, &config).unwrap();
            prop_assert_eq!(first, second);

            if let Some(found) = first {
                prop_assert_eq!(found.width, required as f64);
                for slot in &existing {
                    prop_assert!(!slot_interval(slot, 10.0).intersects(&found));
                }
            }

            let too_wide = shelf.width + 1.0;
            prop_assert_eq!(
                find_available_space(&shelf, &existing, too_wide, &config).unwrap(),
                None
            );
        }
    }
}
