//! Configuration for the depreciation engine

use crate::age::AgePolicy;
use crate::error::{PricingError, Result};
use crate::mileage::MileagePolicy;
use crate::DEFAULT_FLOOR;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Which decay is applied to the baseline first.
///
/// The final price is the same either way; only the split between age loss
/// and mileage loss changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecayOrder {
    /// Age decay on the baseline, then mileage decay on the age-adjusted price
    #[default]
    AgeFirst,
    /// Mileage decay on the baseline, then age decay on the result
    MileageFirst,
}

impl std::str::FromStr for DecayOrder {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age-first" | "age" => Ok(DecayOrder::AgeFirst),
            "mileage-first" | "mileage" => Ok(DecayOrder::MileageFirst),
            other => Err(PricingError::InvalidConfig(format!("unknown decay order '{}'", other))),
        }
    }
}

/// Configuration for the depreciation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Minimum final price; lower results are clamped up to it
    #[serde(default)]
    pub floor: f64,

    /// Attribution order of the two decays
    #[serde(default)]
    pub decay_order: DecayOrder,

    pub age_policy: AgePolicy,

    pub mileage_policy: MileagePolicy,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR,
            decay_order: DecayOrder::AgeFirst,
            age_policy: AgePolicy::tiered_default(),
            mileage_policy: MileagePolicy::segmented_default(),
        }
    }
}

impl PricingConfig {
    pub fn new(age_policy: AgePolicy, mileage_policy: MileagePolicy) -> Self {
        Self { age_policy, mileage_policy, ..Default::default() }
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    pub fn with_decay_order(mut self, decay_order: DecayOrder) -> Self {
        self.decay_order = decay_order;
        self
    }

    /// Check the floor and both policies
    pub fn validate(&self) -> Result<()> {
        if !(self.floor.is_finite() && self.floor >= 0.0) {
            return Err(PricingError::InvalidConfig(format!(
                "floor must be a non-negative number, got {}",
                self.floor
            )));
        }
        self.age_policy.validate()?;
        self.mileage_policy.validate()?;
        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: PricingConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded pricing configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from environment variables
    ///
    /// `PRICING_CONFIG` names a TOML file used instead of the defaults;
    /// `PRICING_FLOOR`, `PRICING_DECAY_ORDER` and `PRICING_AGE_RETENTION`
    /// override individual settings on top of it.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("PRICING_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(floor) = lookup("PRICING_FLOOR") {
            config.floor = floor.trim().parse().map_err(|_| {
                PricingError::InvalidConfig(format!("PRICING_FLOOR is not a number: {}", floor))
            })?;
        }

        if let Some(order) = lookup("PRICING_DECAY_ORDER") {
            config.decay_order = order.parse()?;
        }

        if let Some(retention) = lookup("PRICING_AGE_RETENTION") {
            let retention: f64 = retention.trim().parse().map_err(|_| {
                PricingError::InvalidConfig(format!(
                    "PRICING_AGE_RETENTION is not a number: {}",
                    retention
                ))
            })?;
            config.age_policy = AgePolicy::constant(retention);
        }

        config.validate()?;
        Ok(config)
    }
}
