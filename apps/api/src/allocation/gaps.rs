//! Gap Detector: ordered free intervals on one shelf.
//!
//! One sort plus one linear scan. The scan keeps a running maximum of slot
//! ends, so overlapping or nested slots never yield a negative or phantom gap;
//! flagging the overlap itself is the overlap detector's job.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::allocation::config::SpaceAllocationConfig;
use crate::allocation::geometry::{ordered_slots, Interval};
use crate::models::planogram::{ProductSlot, Shelf};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Where a gap sits relative to the slots around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Before the first slot (or the whole shelf when it has no slots).
    Start,
    /// Between two slots.
    Middle,
    /// After the last slot.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSeverity {
    Minor,
    Major,
}

/// A free interval `[start_x, end_x)` on a shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub start_x: f64,
    pub end_x: f64,
    pub width: f64,
    #[serde(rename = "type")]
    pub kind: GapKind,
    pub severity: GapSeverity,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Every free interval on the shelf, left to right, without significance
/// filtering. Intervals are clipped to `[0, shelf.width)`.
///
/// Slots lying entirely outside the shelf neither open nor label a gap: the
/// first free run is `Start` until an on-shelf slot is seen, and the run that
/// reaches the shelf end is always `End`.
pub(crate) fn free_intervals<S: Borrow<ProductSlot>>(
    shelf: &Shelf,
    slots: &[S],
    default_width: f64,
) -> Vec<(GapKind, Interval)> {
    let shelf_width = shelf.usable_width();
    if shelf_width <= 0.0 {
        return Vec::new();
    }

    let mut free = Vec::new();
    let mut cursor = 0.0_f64;
    let mut seen_slot = false;

    for (_, _, interval) in ordered_slots(slots, default_width) {
        if interval.end_x <= 0.0 {
            continue;
        }
        // Sorted by start, so everything from here on is past the shelf end.
        if interval.start_x >= shelf_width {
            break;
        }
        if interval.start_x > cursor {
            let kind = if seen_slot { GapKind::Middle } else { GapKind::Start };
            free.push((kind, Interval::new(cursor, interval.start_x)));
        }
        seen_slot = true;
        cursor = cursor.max(interval.end_x);
    }

    if cursor < shelf_width {
        let kind = if seen_slot { GapKind::End } else { GapKind::Start };
        free.push((kind, Interval::new(cursor, shelf_width)));
    }

    free
}

/// Significant gaps on the shelf, left to right, each classified by severity.
///
/// Gaps narrower than `min_significant_gap_width` are dropped entirely.
pub fn detect_gaps<S: Borrow<ProductSlot>>(
    shelf: &Shelf,
    slots: &[S],
    config: &SpaceAllocationConfig,
) -> Vec<Gap> {
    free_intervals(shelf, slots, config.default_product_width)
        .into_iter()
        .filter(|(_, interval)| interval.width >= config.min_significant_gap_width)
        .map(|(kind, interval)| Gap {
            start_x: interval.start_x,
            end_x: interval.end_x,
            width: interval.width,
            kind,
            severity: severity_for(interval.width, config),
        })
        .collect()
}

fn severity_for(width: f64, config: &SpaceAllocationConfig) -> GapSeverity {
    if width >= config.major_gap_width {
        GapSeverity::Major
    } else {
        GapSeverity::Minor
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
