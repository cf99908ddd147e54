//! Age decay policies
//!
//! An age policy maps a vehicle's age in whole years to a multiplier in (0, 1].
//! Age 0 always maps to 1.0 and every additional year strictly lowers the
//! multiplier, because every retention rate is required to lie in (0, 1).

use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};

/// How value is lost as a vehicle gets older
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AgePolicy {
    /// The same retention rate every year: `retention ^ age`
    ConstantRate { retention: f64 },

    /// Each year takes the retention rate of the tier covering it
    Tiered { tiers: Vec<AgeTier> },
}

/// A contiguous run of years sharing one retention rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeTier {
    /// First year of the tier (years are counted from 1)
    pub from_year: u32,

    /// Last year of the tier, inclusive. `None` means open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_year: Option<u32>,

    /// Fraction of value kept over one year in this tier
    pub retention: f64,
}

impl AgeTier {
    pub fn new(from_year: u32, to_year: Option<u32>, retention: f64) -> Self {
        Self { from_year, to_year, retention }
    }

    fn covers(&self, year: u32) -> bool {
        year >= self.from_year && self.to_year.map_or(true, |to| year <= to)
    }

    /// Number of years in `1..=age` that fall inside this tier
    fn years_within(&self, age: u32) -> u32 {
        if age < self.from_year {
            return 0;
        }
        let last = self.to_year.map_or(age, |to| to.min(age));
        if last < self.from_year {
            return 0;
        }
        last - self.from_year + 1
    }
}

impl Default for AgePolicy {
    fn default() -> Self {
        Self::tiered_default()
    }
}

impl AgePolicy {
    /// Constant-rate policy, e.g. `AgePolicy::constant(0.97)` for 3% per year
    pub fn constant(retention: f64) -> Self {
        AgePolicy::ConstantRate { retention }
    }

    /// Steep first year, moderate years 2-4, gentle afterwards
    pub fn tiered_default() -> Self {
        AgePolicy::Tiered {
            tiers: vec![
                AgeTier::new(1, Some(1), 0.85),
                AgeTier::new(2, Some(4), 0.90),
                AgeTier::new(5, None, 0.94),
            ],
        }
    }

    /// Check rates and tier layout
    pub fn validate(&self) -> Result<()> {
        match self {
            AgePolicy::ConstantRate { retention } => check_retention("age retention", *retention),
            AgePolicy::Tiered { tiers } => {
                let Some(first) = tiers.first() else {
                    return Err(PricingError::InvalidConfig(
                        "tiered age policy needs at least one tier".to_string(),
                    ));
                };
                if first.from_year != 1 {
                    return Err(PricingError::InvalidConfig(format!(
                        "first age tier must start at year 1, got {}",
                        first.from_year
                    )));
                }

                let mut next_year = 1u32;
                for (i, tier) in tiers.iter().enumerate() {
                    check_retention("age tier retention", tier.retention)?;
                    if tier.from_year != next_year {
                        return Err(PricingError::InvalidConfig(format!(
                            "age tier {} starts at year {}, expected {}",
                            i, tier.from_year, next_year
                        )));
                    }
                    let is_last = i + 1 == tiers.len();
                    match tier.to_year {
                        Some(to) if to < tier.from_year => {
                            return Err(PricingError::InvalidConfig(format!(
                                "age tier {} ends (year {}) before it starts (year {})",
                                i, to, tier.from_year
                            )));
                        }
                        Some(_) if is_last => {
                            return Err(PricingError::InvalidConfig(
                                "last age tier must be open-ended".to_string(),
                            ));
                        }
                        None if !is_last => {
                            return Err(PricingError::InvalidConfig(format!(
                                "only the last age tier may be open-ended (tier {})",
                                i
                            )));
                        }
                        Some(to) => next_year = to.saturating_add(1),
                        None => {}
                    }
                }
                Ok(())
            }
        }
    }

    /// Retention applied over the given year (1-based)
    pub fn retention_for_year(&self, year: u32) -> f64 {
        match self {
            AgePolicy::ConstantRate { retention } => *retention,
            AgePolicy::Tiered { tiers } => tiers
                .iter()
                .find(|tier| tier.covers(year))
                .map(|tier| tier.retention)
                .unwrap_or(1.0),
        }
    }

    /// Multiplier for a vehicle of `age` whole years
    pub fn multiplier(&self, age: u32) -> f64 {
        match self {
            AgePolicy::ConstantRate { retention } => retention.powf(f64::from(age)),
            AgePolicy::Tiered { tiers } => tiers
                .iter()
                .map(|tier| tier.retention.powf(f64::from(tier.years_within(age))))
                .product(),
        }
    }
}

pub(crate) fn check_retention(what: &str, retention: f64) -> Result<()> {
    if retention.is_finite() && retention > 0.0 && retention < 1.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidConfig(format!(
            "{} must be in (0, 1), got {}",
            what, retention
        )))
    }
}
