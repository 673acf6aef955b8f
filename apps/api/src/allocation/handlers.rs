//! Axum route handlers for the space allocation API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::allocation::{
    auto_adjust_slot_position, calculate_shelf_utilization, can_add_slot, find_available_space,
    generate_optimization_suggestions, validate, Interval, OptimizationSuggestion,
    PlacementDecision, ShelfUtilization, SpaceAllocationConfig, ValidationResult,
};
use crate::errors::AppError;
use crate::models::planogram::{ProductSlot, Shelf};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlanogramRequest {
    pub shelves: Vec<Shelf>,
    #[serde(default)]
    pub slots: Vec<ProductSlot>,
    pub config: Option<SpaceAllocationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PlanogramInput {
    pub shelves: Vec<Shelf>,
    #[serde(default)]
    pub slots: Vec<ProductSlot>,
}

#[derive(Debug, Deserialize)]
pub struct BatchValidateRequest {
    pub planograms: Vec<PlanogramInput>,
    pub config: Option<SpaceAllocationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ShelfRequest {
    pub shelf: Shelf,
    #[serde(default)]
    pub slots: Vec<ProductSlot>,
    pub config: Option<SpaceAllocationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PlacementRequest {
    pub shelf: Shelf,
    #[serde(default)]
    pub existing_slots: Vec<ProductSlot>,
    pub new_slot: ProductSlot,
    pub config: Option<SpaceAllocationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct FindSpaceRequest {
    pub shelf: Shelf,
    #[serde(default)]
    pub existing_slots: Vec<ProductSlot>,
    pub required_width: f64,
    pub config: Option<SpaceAllocationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub report_id: Uuid,
    pub validated_at: DateTime<Utc>,
    pub result: ValidationResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchValidateResponse {
    pub results: Vec<ValidateResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub suggestions: Vec<OptimizationSuggestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindSpaceResponse {
    pub interval: Option<Interval>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoAdjustResponse {
    pub slot: Option<ProductSlot>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/planograms/validate
pub async fn handle_validate(
    State(state): State<AppState>,
    Json(request): Json<PlanogramRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let config = resolve_config(&state, request.config)?;
    let (shelves, slots) = (request.shelves, request.slots);

    let result = tokio::task::spawn_blocking(move || validate(&shelves, &slots, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in validate: {e}")))?;

    let response = stamp(result);
    info!(
        report_id = %response.report_id,
        valid = response.result.valid,
        errors = response.result.errors.len(),
        warnings = response.result.warnings.len(),
        "Planogram validated"
    );
    Ok(Json(response))
}

/// POST /api/v1/planograms/validate/batch
///
/// Each planogram is validated on its own blocking task; results keep input order.
pub async fn handle_validate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchValidateRequest>,
) -> Result<Json<BatchValidateResponse>, AppError> {
    let config = resolve_config(&state, request.config)?;

    let handles: Vec<_> = request
        .planograms
        .into_iter()
        .map(|planogram| {
            let config = config.clone();
            tokio::task::spawn_blocking(move || {
                validate(&planogram.shelves, &planogram.slots, &config)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "spawn_blocking failed in batch validate: {e}"
            ))
        })?;
        results.push(stamp(result));
    }

    info!(planograms = results.len(), "Planogram batch validated");
    Ok(Json(BatchValidateResponse { results }))
}

/// POST /api/v1/planograms/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<PlanogramRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let config = resolve_config(&state, request.config)?;
    let (shelves, slots) = (request.shelves, request.slots);

    let suggestions = tokio::task::spawn_blocking(move || {
        generate_optimization_suggestions(&shelves, &slots, &config)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in optimize: {e}")))?;

    Ok(Json(OptimizeResponse { suggestions }))
}

/// POST /api/v1/shelves/utilization
pub async fn handle_shelf_utilization(
    State(state): State<AppState>,
    Json(request): Json<ShelfRequest>,
) -> Result<Json<ShelfUtilization>, AppError> {
    let config = resolve_config(&state, request.config)?;
    Ok(Json(calculate_shelf_utilization(
        &request.shelf,
        &request.slots,
        &config,
    )))
}

/// POST /api/v1/shelves/placement/check
pub async fn handle_can_add_slot(
    State(state): State<AppState>,
    Json(request): Json<PlacementRequest>,
) -> Result<Json<PlacementDecision>, AppError> {
    let config = resolve_config(&state, request.config)?;
    let decision = can_add_slot(
        &request.shelf,
        &request.existing_slots,
        &request.new_slot,
        &config,
    )?;
    info!(
        shelf_id = %request.shelf.id,
        product_id = %request.new_slot.product_id,
        accepted = decision.is_accepted(),
        reason = ?decision.reason(),
        suggested = ?decision.suggested_position(),
        "Placement checked"
    );
    Ok(Json(decision))
}

/// POST /api/v1/shelves/placement/find-space
pub async fn handle_find_space(
    State(state): State<AppState>,
    Json(request): Json<FindSpaceRequest>,
) -> Result<Json<FindSpaceResponse>, AppError> {
    let config = resolve_config(&state, request.config)?;
    let interval = find_available_space(
        &request.shelf,
        &request.existing_slots,
        request.required_width,
        &config,
    )?;
    Ok(Json(FindSpaceResponse { interval }))
}

/// POST /api/v1/shelves/placement/auto-adjust
pub async fn handle_auto_adjust(
    State(state): State<AppState>,
    Json(request): Json<PlacementRequest>,
) -> Result<Json<AutoAdjustResponse>, AppError> {
    let config = resolve_config(&state, request.config)?;
    let slot = auto_adjust_slot_position(
        &request.shelf,
        &request.existing_slots,
        &request.new_slot,
        &config,
    )?;
    Ok(Json(AutoAdjustResponse { slot }))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// A request-supplied config wins over the process default, after validation.
fn resolve_config(
    state: &AppState,
    requested: Option<SpaceAllocationConfig>,
) -> Result<SpaceAllocationConfig, AppError> {
    match requested {
        Some(config) => {
            config.validate()?;
            Ok(config)
        }
        None => Ok(state.allocation.clone()),
    }
}

fn stamp(result: ValidationResult) -> ValidateResponse {
    ValidateResponse {
        report_id: Uuid::new_v4(),
        validated_at: Utc::now(),
        result,
    }
}
