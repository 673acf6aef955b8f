use std::str::FromStr;

use anyhow::{Context, Result};

use crate::allocation::SpaceAllocationConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; unparsable values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Process-default allocation policy, used when a request carries none.
    pub allocation: SpaceAllocationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = SpaceAllocationConfig::default();
        let allocation = SpaceAllocationConfig {
            underutilized_threshold: env_or(
                "SPACE_UNDERUTILIZED_THRESHOLD",
                defaults.underutilized_threshold,
            )?,
            optimal_threshold: env_or("SPACE_OPTIMAL_THRESHOLD", defaults.optimal_threshold)?,
            overutilized_threshold: env_or(
                "SPACE_OVERUTILIZED_THRESHOLD",
                defaults.overutilized_threshold,
            )?,
            min_significant_gap_width: env_or(
                "SPACE_MIN_SIGNIFICANT_GAP_WIDTH",
                defaults.min_significant_gap_width,
            )?,
            major_gap_width: env_or("SPACE_MAJOR_GAP_WIDTH", defaults.major_gap_width)?,
            default_product_width: env_or(
                "SPACE_DEFAULT_PRODUCT_WIDTH",
                defaults.default_product_width,
            )?,
            strict_mode: env_or("SPACE_STRICT_MODE", defaults.strict_mode)?,
            allow_overlap: env_or("SPACE_ALLOW_OVERLAP", defaults.allow_overlap)?,
        };
        allocation
            .validate()
            .context("SPACE_* environment variables describe an invalid allocation config")?;

        Ok(Config {
            port: env_or("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            allocation,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
