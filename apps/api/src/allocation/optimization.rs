//! Optimization Advisor: shelf-level remediation proposals.
//!
//! # Rules
//! - Shelf with a `major` gap → COMPRESS: left-pack every slot in
//!   `position_x` order. Only emitted when at least one slot actually moves,
//!   so applying a COMPRESS and re-running yields no further COMPRESS.
//! - `underutilized` shelf with slots → REDISTRIBUTE: advisory facing
//!   increase targeting `optimal_threshold`.
//!
//! Heuristic only: nothing here is globally optimal and nothing is mutated.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::config::SpaceAllocationConfig;
use crate::allocation::gaps::GapSeverity;
use crate::allocation::geometry::{ordered_slots, ShelfStatus, EPSILON};
use crate::allocation::utilization::calculate_shelf_utilization;
use crate::allocation::validator::group_slots_by_shelf;
use crate::models::planogram::{ProductSlot, Shelf};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    Compress,
    Redistribute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLocation {
    pub shelf_id: String,
    pub position_x: f64,
}

/// A single concrete step of a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SuggestedAction {
    Move {
        product_id: String,
        from: SlotLocation,
        to: SlotLocation,
        reason: String,
    },
    IncreaseFacings {
        product_id: String,
        shelf_id: String,
        current_facings: u32,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub kind: SuggestionKind,
    pub shelf_id: String,
    pub shelf_level: i32,
    pub description: String,
    pub actions: Vec<SuggestedAction>,
    pub current_utilization: f64,
    pub projected_utilization: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Proposes COMPRESS and REDISTRIBUTE suggestions shelf by shelf, in input order.
pub fn generate_optimization_suggestions(
    shelves: &[Shelf],
    slots: &[ProductSlot],
    config: &SpaceAllocationConfig,
) -> Vec<OptimizationSuggestion> {
    let grouped = group_slots_by_shelf(slots);
    let mut suggestions = Vec::new();

    for shelf in shelves {
        let shelf_slots = grouped
            .get(shelf.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let util = calculate_shelf_utilization(shelf, shelf_slots, config);

        let has_major_gap = util.gaps.iter().any(|g| g.severity == GapSeverity::Major);
        if has_major_gap {
            let moves = compress_moves(shelf, shelf_slots, config);
            if !moves.is_empty() {
                suggestions.push(OptimizationSuggestion {
                    kind: SuggestionKind::Compress,
                    shelf_id: shelf.id.clone(),
                    shelf_level: shelf.level,
                    description: format!(
                        "Pack {} product(s) on shelf {} to the left to merge free space into one run",
                        moves.len(),
                        shelf.level
                    ),
                    actions: moves,
                    current_utilization: util.percentage,
                    // Compression moves slots, it never changes occupied width.
                    projected_utilization: util.percentage,
                });
            }
        }

        if util.status == ShelfStatus::Underutilized {
            if let Some(action) = facing_increase(shelf, shelf_slots, config) {
                suggestions.push(OptimizationSuggestion {
                    kind: SuggestionKind::Redistribute,
                    shelf_id: shelf.id.clone(),
                    shelf_level: shelf.level,
                    description: format!(
                        "Shelf {} is {:.1}% utilized; add facings to reach about {:.0}%",
                        shelf.level, util.percentage, config.optimal_threshold
                    ),
                    actions: vec![action],
                    current_utilization: util.percentage,
                    projected_utilization: config.optimal_threshold,
                });
            }
        }
    }

    debug!(
        shelves = shelves.len(),
        suggestions = suggestions.len(),
        "Optimization suggestions generated"
    );
    suggestions
}

/// Left-pack moves for one shelf: each slot, in `position_x` order, is placed
/// immediately after the previous one, the first at 0. Slots already within
/// `EPSILON` of their packed position produce no move.
pub fn compress_moves<S: Borrow<ProductSlot>>(
    shelf: &Shelf,
    slots: &[S],
    config: &SpaceAllocationConfig,
) -> Vec<SuggestedAction> {
    let mut cursor = 0.0_f64;
    let mut moves = Vec::new();

    for (_, slot, interval) in ordered_slots(slots, config.default_product_width) {
        if (slot.position_x - cursor).abs() > EPSILON {
            moves.push(SuggestedAction::Move {
                product_id: slot.product_id.clone(),
                from: SlotLocation {
                    shelf_id: shelf.id.clone(),
                    position_x: slot.position_x,
                },
                to: SlotLocation {
                    shelf_id: shelf.id.clone(),
                    position_x: cursor,
                },
                reason: "Close gap by packing to the left".to_string(),
            });
        }
        cursor += interval.width;
    }

    moves
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// One representative facing increase: the leftmost slot on the shelf.
fn facing_increase<S: Borrow<ProductSlot>>(
    shelf: &Shelf,
    slots: &[S],
    config: &SpaceAllocationConfig,
) -> Option<SuggestedAction> {
    let (_, slot, _) = ordered_slots(slots, config.default_product_width)
        .into_iter()
        .next()?;
    Some(SuggestedAction::IncreaseFacings {
        product_id: slot.product_id.clone(),
        shelf_id: shelf.id.clone(),
        current_facings: slot.facings.unwrap_or(1).max(1),
        reason: "Extra facings raise shelf utilization toward the optimal band".to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
