//! Validator: the orchestrating entry point for a whole planogram.
//!
//! Runs the utilization calculator and overlap detector over every shelf and
//! folds the findings into one `ValidationResult`. Never fails: malformed but
//! representable input (negative widths, empty lists) is clamped, and geometric
//! problems come back as issues.
//!
//! # Issue rules, per shelf
//! - status `exceeded`            → `SPACE_EXCEEDED` error
//! - slot outside `[0, width]`    → `OUT_OF_BOUNDS` error
//! - overlapping pair             → `OVERLAP` error (unless `allow_overlap`)
//! - `major` gap                  → `LARGE_GAP` warning
//! - status `underutilized`       → `UNDERUTILIZED` info, plus
//!   `EYE_LEVEL_UNDERUSED` warning on eye-level shelves
//!
//! Slots referencing no shelf in the input each produce an `ORPHAN_SLOT` error.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::config::SpaceAllocationConfig;
use crate::allocation::gaps::GapSeverity;
use crate::allocation::geometry::{fits_within, slot_interval, ShelfStatus};
use crate::allocation::overlap::detect_overlaps;
use crate::allocation::utilization::{calculate_shelf_utilization, ShelfUtilization};
use crate::models::planogram::{ProductSlot, Shelf};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    SpaceExceeded,
    Overlap,
    OrphanSlot,
    OutOfBounds,
    LargeGap,
    Underutilized,
    EyeLevelUnderused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

/// One finding of a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: IssueSeverity,
    pub shelf_id: Option<String>,
    pub product_ids: Vec<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Rollups across every shelf in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationTotals {
    pub shelf_count: usize,
    pub slot_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub total_width: f64,
    pub total_used_width: f64,
    pub total_remaining_width: f64,
    /// Mean of the per-shelf percentages; 0 with no shelves.
    pub average_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// No errors were found.
    pub valid: bool,
    /// `valid`, or any layout when strict mode is off.
    pub can_add: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub shelves: Vec<ShelfUtilization>,
    pub totals: ValidationTotals,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Validates a planogram (or a section of one).
pub fn validate(
    shelves: &[Shelf],
    slots: &[ProductSlot],
    config: &SpaceAllocationConfig,
) -> ValidationResult {
    let grouped = group_slots_by_shelf(slots);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut utilizations = Vec::with_capacity(shelves.len());

    for shelf in shelves {
        let shelf_slots = grouped
            .get(shelf.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let util = calculate_shelf_utilization(shelf, shelf_slots, config);
        check_shelf(shelf, shelf_slots, &util, config, &mut errors, &mut warnings);
        utilizations.push(util);
    }

    let known: HashSet<&str> = shelves.iter().map(|s| s.id.as_str()).collect();
    for slot in slots.iter().filter(|s| !known.contains(s.shelf_id.as_str())) {
        errors.push(ValidationIssue {
            code: IssueCode::OrphanSlot,
            severity: IssueSeverity::Error,
            shelf_id: Some(slot.shelf_id.clone()),
            product_ids: vec![slot.product_id.clone()],
            message: format!(
                "Product '{}' references unknown shelf '{}'",
                slot.product_id, slot.shelf_id
            ),
            suggestion: Some("Assign the product to an existing shelf or remove it".to_string()),
        });
    }

    let totals = compute_totals(&utilizations, slots.len(), errors.len(), warnings.len());
    let valid = errors.is_empty();
    let can_add = valid || !config.strict_mode;

    debug!(
        shelves = totals.shelf_count,
        slots = totals.slot_count,
        errors = totals.error_count,
        warnings = totals.warning_count,
        valid,
        "Planogram validated"
    );

    ValidationResult {
        valid,
        can_add,
        errors,
        warnings,
        shelves: utilizations,
        totals,
    }
}

/// Groups slots by the shelf they reference, keeping input order per shelf.
pub(crate) fn group_slots_by_shelf(slots: &[ProductSlot]) -> HashMap<&str, Vec<&ProductSlot>> {
    let mut grouped: HashMap<&str, Vec<&ProductSlot>> = HashMap::new();
    for slot in slots {
        grouped.entry(slot.shelf_id.as_str()).or_default().push(slot);
    }
    grouped
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn check_shelf(
    shelf: &Shelf,
    slots: &[&ProductSlot],
    util: &ShelfUtilization,
    config: &SpaceAllocationConfig,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    if util.status == ShelfStatus::Exceeded {
        errors.push(ValidationIssue {
            code: IssueCode::SpaceExceeded,
            severity: IssueSeverity::Error,
            shelf_id: Some(shelf.id.clone()),
            product_ids: Vec::new(),
            message: format!(
                "Shelf {} is at {:.1}% ({:.1}cm used of {:.1}cm)",
                shelf.level, util.percentage, util.used_width, util.total_width
            ),
            suggestion: Some("Reduce facings or move products to another shelf".to_string()),
        });
    }

    for slot in slots {
        let interval = slot_interval(slot, config.default_product_width);
        if !fits_within(&interval, util.total_width) {
            errors.push(ValidationIssue {
                code: IssueCode::OutOfBounds,
                severity: IssueSeverity::Error,
                shelf_id: Some(shelf.id.clone()),
                product_ids: vec![slot.product_id.clone()],
                message: format!(
                    "Product '{}' occupies [{:.1}, {:.1}) outside shelf width {:.1}cm",
                    slot.product_id, interval.start_x, interval.end_x, util.total_width
                ),
                suggestion: Some("Move the product inside the shelf bounds".to_string()),
            });
        }
    }

    for pair in detect_overlaps(slots, config) {
        errors.push(ValidationIssue {
            code: IssueCode::Overlap,
            severity: IssueSeverity::Error,
            shelf_id: Some(shelf.id.clone()),
            product_ids: vec![pair.first_product_id.clone(), pair.second_product_id.clone()],
            message: format!(
                "Products '{}' and '{}' overlap by {:.1}cm on [{:.1}, {:.1})",
                pair.first_product_id,
                pair.second_product_id,
                pair.overlap_width(),
                pair.overlap_start,
                pair.overlap_end
            ),
            suggestion: Some("Reposition one of the products".to_string()),
        });
    }

    for gap in util.gaps.iter().filter(|g| g.severity == GapSeverity::Major) {
        warnings.push(ValidationIssue {
            code: IssueCode::LargeGap,
            severity: IssueSeverity::Warning,
            shelf_id: Some(shelf.id.clone()),
            product_ids: Vec::new(),
            message: format!(
                "{:.1}cm gap at [{:.1}, {:.1}) on shelf {}",
                gap.width, gap.start_x, gap.end_x, shelf.level
            ),
            suggestion: Some(
                "Redistribute products or add facings to close the gap".to_string(),
            ),
        });
    }

    if util.status == ShelfStatus::Underutilized {
        warnings.push(ValidationIssue {
            code: IssueCode::Underutilized,
            severity: IssueSeverity::Info,
            shelf_id: Some(shelf.id.clone()),
            product_ids: Vec::new(),
            message: format!(
                "Shelf {} is only {:.1}% utilized",
                shelf.level, util.percentage
            ),
            suggestion: Some(format!(
                "Add products or facings to reach at least {:.0}%",
                config.underutilized_threshold
            )),
        });

        if shelf.eye_level {
            warnings.push(ValidationIssue {
                code: IssueCode::EyeLevelUnderused,
                severity: IssueSeverity::Warning,
                shelf_id: Some(shelf.id.clone()),
                product_ids: Vec::new(),
                message: format!(
                    "Eye-level shelf {} is only {:.1}% utilized",
                    shelf.level, util.percentage
                ),
                suggestion: Some(
                    "Eye level is the highest-value position: fill it with best sellers first"
                        .to_string(),
                ),
            });
        }
    }
}

fn compute_totals(
    utilizations: &[ShelfUtilization],
    slot_count: usize,
    error_count: usize,
    warning_count: usize,
) -> ValidationTotals {
    let total_width: f64 = utilizations.iter().map(|u| u.total_width).sum();
    let total_used_width: f64 = utilizations.iter().map(|u| u.used_width).sum();
    let total_remaining_width: f64 = utilizations.iter().map(|u| u.available_width).sum();
    let average_utilization = if utilizations.is_empty() {
        0.0
    } else {
        utilizations.iter().map(|u| u.percentage).sum::<f64>() / utilizations.len() as f64
    };

    ValidationTotals {
        shelf_count: utilizations.len(),
        slot_count,
        error_count,
        warning_count,
        total_width,
        total_used_width,
        total_remaining_width,
        average_utilization,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
