//! Geometry primitives shared by every allocation component.
//!
//! The missing-width fallback lives in exactly one place: `occupied_width`.
//! Positional comparisons that involve sums of widths go through `EPSILON`.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::allocation::config::SpaceAllocationConfig;
use crate::models::planogram::ProductSlot;

/// Float slack for comparing positions built from sums of widths, in centimeters.
pub const EPSILON: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Utilization band of a shelf. Variants are declared in increasing severity,
/// so `Ord` follows empty < underutilized < optimal < overutilized < exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfStatus {
    Empty,
    Underutilized,
    Optimal,
    Overutilized,
    Exceeded,
}

/// Half-open interval `[start_x, end_x)` along a shelf, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start_x: f64,
    pub end_x: f64,
    pub width: f64,
}

impl Interval {
    pub fn new(start_x: f64, end_x: f64) -> Self {
        Self {
            start_x,
            end_x,
            width: end_x - start_x,
        }
    }

    /// Half-open intersection test.
    pub fn intersects(&self, other: &Interval) -> bool {
        self.start_x < other.end_x && other.start_x < self.end_x
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Primitives
// ────────────────────────────────────────────────────────────────────────────

/// Width a slot occupies on its shelf: per-facing width times facings.
///
/// A missing, non-positive or non-finite per-facing width falls back to
/// `default_width`; facings are clamped to at least 1.
pub fn occupied_width(slot: &ProductSlot, default_width: f64) -> f64 {
    let per_facing = match slot.width {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => default_width,
    };
    let facings = slot.facings.unwrap_or(1).max(1);
    per_facing * facings as f64
}

/// The interval `[position_x, position_x + occupied_width)` a slot covers.
pub fn slot_interval(slot: &ProductSlot, default_width: f64) -> Interval {
    let start = slot.position_x;
    Interval::new(start, start + occupied_width(slot, default_width))
}

/// Whether `interval` lies inside `[0, shelf_width]`. The far edge gets
/// `EPSILON` of slack so `0.1 + 0.2` still fits a 0.3cm shelf.
pub fn fits_within(interval: &Interval, shelf_width: f64) -> bool {
    interval.start_x >= 0.0 && interval.end_x <= shelf_width + EPSILON
}

/// `used / total * 100`, or 0 when the total is not positive. Unbounded above.
pub fn utilization_percentage(used: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    used / total * 100.0
}

/// Maps a utilization percentage onto its status band.
pub fn classify_status(percentage: f64, config: &SpaceAllocationConfig) -> ShelfStatus {
    if percentage <= 0.0 {
        ShelfStatus::Empty
    } else if percentage < config.underutilized_threshold {
        ShelfStatus::Underutilized
    } else if percentage <= config.optimal_threshold {
        ShelfStatus::Optimal
    } else if percentage <= config.overutilized_threshold {
        ShelfStatus::Overutilized
    } else {
        ShelfStatus::Exceeded
    }
}

/// Slots paired with their input index and interval, ordered by `position_x`.
/// Ties fall back to `product_id`, then input index, so output is stable.
///
/// Accepts owned or borrowed slots so per-shelf groupings never copy input.
pub(crate) fn ordered_slots<S: Borrow<ProductSlot>>(
    slots: &[S],
    default_width: f64,
) -> Vec<(usize, &ProductSlot, Interval)> {
    let mut ordered: Vec<(usize, &ProductSlot, Interval)> = slots
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let slot = s.borrow();
            (i, slot, slot_interval(slot, default_width))
        })
        .collect();
    ordered.sort_by(|(ia, a, _), (ib, b, _)| {
        a.position_x
            .total_cmp(&b.position_x)
            .then_with(|| a.product_id.cmp(&b.product_id))
            .then_with(|| ia.cmp(ib))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_slot(width: Option<f64>, facings: Option<u32>) -> ProductSlot {
        ProductSlot {
            product_id: "sku".to_string(),
            shelf_id: "s1".to_string(),
            position_x: 0.0,
            width,
            facings,
        }
    }

    // ── occupied_width ──────────────────────────────────────────────────────

    #[test]
    fn test_occupied_width_multiplies_facings() {
        assert_eq!(occupied_width(&make_slot(Some(8.0), Some(3)), 10.0), 24.0);
    }

    #[test]
    fn test_occupied_width_missing_width_uses_default() {
        assert_eq!(occupied_width(&make_slot(None, Some(2)), 10.0), 20.0);
    }

    #[test]
    fn test_occupied_width_non_positive_width_uses_default() {
        assert_eq!(occupied_width(&make_slot(Some(0.0), None), 10.0), 10.0);
        assert_eq!(occupied_width(&make_slot(Some(-4.0), None), 10.0), 10.0);
    }

    #[test]
    fn test_occupied_width_zero_facings_clamped_to_one() {
        assert_eq!(occupied_width(&make_slot(Some(7.0), Some(0)), 10.0), 7.0);
    }

    // ── utilization_percentage ──────────────────────────────────────────────

    #[test]
    fn test_utilization_zero_total() {
        assert_eq!(utilization_percentage(50.0, 0.0), 0.0);
        assert_eq!(utilization_percentage(50.0, -10.0), 0.0);
    }

    #[test]
    fn test_utilization_can_exceed_hundred() {
        assert!((utilization_percentage(150.0, 100.0) - 150.0).abs() < 1e-9);
    }

    // ── classify_status ─────────────────────────────────────────────────────

    #[test]
    fn test_classify_each_band() {
        let config = SpaceAllocationConfig::default(); // 60 / 90 / 100
        assert_eq!(classify_status(0.0, &config), ShelfStatus::Empty);
        assert_eq!(classify_status(30.0, &config), ShelfStatus::Underutilized);
        assert_eq!(classify_status(75.0, &config), ShelfStatus::Optimal);
        assert_eq!(classify_status(95.0, &config), ShelfStatus::Overutilized);
        assert_eq!(classify_status(100.5, &config), ShelfStatus::Exceeded);
    }

    #[test]
    fn test_classify_band_edges_are_inclusive_of_optimal() {
        let config = SpaceAllocationConfig::default();
        assert_eq!(classify_status(60.0, &config), ShelfStatus::Optimal);
        assert_eq!(classify_status(90.0, &config), ShelfStatus::Optimal);
        assert_eq!(classify_status(100.0, &config), ShelfStatus::Overutilized);
    }

    #[test]
    fn test_interval_half_open_touching_does_not_intersect() {
        let a = Interval::new(0.0, 20.0);
        let b = Interval::new(20.0, 30.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
        assert!(a.intersects(&Interval::new(19.9, 25.0)));
    }

    #[test]
    fn test_fits_within_tolerates_float_sum_at_edge() {
        // 0.1 + 0.2 == 0.30000000000000004
        assert!(fits_within(&Interval::new(0.1, 0.1 + 0.2), 0.3));
        assert!(fits_within(&Interval::new(0.0, 100.0), 100.0));
        assert!(!fits_within(&Interval::new(95.0, 100.01), 100.0));
        assert!(!fits_within(&Interval::new(-0.5, 5.0), 100.0));
    }

    #[test]
    fn test_ordered_slots_accepts_borrowed_slots() {
        let a = ProductSlot {
            position_x: 30.0,
            ..make_slot(Some(5.0), None)
        };
        let b = make_slot(Some(5.0), None);
        let borrowed = vec![&a, &b];
        let ordered = ordered_slots(&borrowed, 10.0);
        assert_eq!(ordered[0].0, 1);
        assert_eq!(ordered[1].2, Interval::new(30.0, 35.0));
    }

    proptest! {
        #[test]
        fn status_is_monotonic_in_used_width(
            shelf_width in 1.0f64..500.0,
            a in 0.0f64..800.0,
            b in 0.0f64..800.0,
        ) {
            let config = SpaceAllocationConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_status = classify_status(utilization_percentage(lo, shelf_width), &config);
            let hi_status = classify_status(utilization_percentage(hi, shelf_width), &config);
            prop_assert!(lo_status <= hi_status);
        }
    }
}
