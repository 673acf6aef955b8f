//! Tunable thresholds and policy flags for the allocation core.
//!
//! Every entry point takes a `&SpaceAllocationConfig` explicitly; nothing in
//! `allocation` reads process-wide state.

use serde::{Deserialize, Serialize};

use crate::allocation::error::AllocationError;

/// Space allocation policy.
///
/// Status bands for a utilization percentage `p`:
/// - `p == 0` → empty
/// - `0 < p < underutilized_threshold` → underutilized
/// - `underutilized_threshold <= p <= optimal_threshold` → optimal
/// - `optimal_threshold < p <= overutilized_threshold` → overutilized
/// - `p > overutilized_threshold` → exceeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceAllocationConfig {
    /// Percent below which a shelf is underutilized.
    pub underutilized_threshold: f64,
    /// Upper edge of the optimal band, also the REDISTRIBUTE target.
    pub optimal_threshold: f64,
    /// Capacity cut point; anything above is `exceeded`.
    pub overutilized_threshold: f64,
    /// Gaps narrower than this (cm) are not reported.
    pub min_significant_gap_width: f64,
    /// Gaps at least this wide (cm) are `major`.
    pub major_gap_width: f64,
    /// Per-facing width (cm) used when a slot has none.
    pub default_product_width: f64,
    /// When set, an exceeded shelf blocks placement.
    pub strict_mode: bool,
    /// When set, overlap detection is skipped entirely.
    pub allow_overlap: bool,
}

impl Default for SpaceAllocationConfig {
    /// 60 / 90 / 100 percent bands, 2 cm significance floor, 20 cm major gaps,
    /// 10 cm default facing, non-strict, overlaps checked.
    fn default() -> Self {
        Self {
            underutilized_threshold: 60.0,
            optimal_threshold: 90.0,
            overutilized_threshold: 100.0,
            min_significant_gap_width: 2.0,
            major_gap_width: 20.0,
            default_product_width: 10.0,
            strict_mode: false,
            allow_overlap: false,
        }
    }
}

impl SpaceAllocationConfig {
    /// Checks that the thresholds are finite and ordered.
    pub fn validate(&self) -> Result<(), AllocationError> {
        let numbers = [
            ("underutilized_threshold", self.underutilized_threshold),
            ("optimal_threshold", self.optimal_threshold),
            ("overutilized_threshold", self.overutilized_threshold),
            ("min_significant_gap_width", self.min_significant_gap_width),
            ("major_gap_width", self.major_gap_width),
            ("default_product_width", self.default_product_width),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AllocationError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }

        if !(self.underutilized_threshold > 0.0
            && self.underutilized_threshold < self.optimal_threshold
            && self.optimal_threshold <= self.overutilized_threshold)
        {
            return Err(AllocationError::InvalidConfig(format!(
                "thresholds must satisfy 0 < underutilized ({}) < optimal ({}) <= overutilized ({})",
                self.underutilized_threshold, self.optimal_threshold, self.overutilized_threshold
            )));
        }

        if self.min_significant_gap_width < 0.0
            || self.min_significant_gap_width > self.major_gap_width
        {
            return Err(AllocationError::InvalidConfig(format!(
                "gap widths must satisfy 0 <= min_significant ({}) <= major ({})",
                self.min_significant_gap_width, self.major_gap_width
            )));
        }

        if self.default_product_width <= 0.0 {
            return Err(AllocationError::InvalidConfig(format!(
                "default_product_width must be positive, got {}",
                self.default_product_width
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SpaceAllocationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let config = SpaceAllocationConfig {
            underutilized_threshold: 95.0,
            optimal_threshold: 90.0,
            ..SpaceAllocationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AllocationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_optimal_may_equal_overutilized() {
        let config = SpaceAllocationConfig {
            optimal_threshold: 100.0,
            overutilized_threshold: 100.0,
            ..SpaceAllocationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let config = SpaceAllocationConfig {
            major_gap_width: f64::NAN,
            ..SpaceAllocationConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("major_gap_width"));
    }

    #[test]
    fn test_significance_floor_above_major_rejected() {
        let config = SpaceAllocationConfig {
            min_significant_gap_width: 30.0,
            major_gap_width: 20.0,
            ..SpaceAllocationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_default_width_rejected() {
        let config = SpaceAllocationConfig {
            default_product_width: 0.0,
            ..SpaceAllocationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SpaceAllocationConfig =
            serde_json::from_str(r#"{"strict_mode": true, "major_gap_width": 15.0}"#).unwrap();
        assert!(config.strict_mode);
        assert_eq!(config.major_gap_width, 15.0);
        assert_eq!(config.underutilized_threshold, 60.0);
    }
}
