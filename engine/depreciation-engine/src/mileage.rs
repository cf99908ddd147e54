//! Mileage decay policies

use crate::age::check_retention;
use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};

/// How value is lost as mileage accumulates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MileagePolicy {
    /// Linear loss up to `cap`, then a flat amount per `tail_interval`.
    ///
    /// `tail_amount` is money, so it is converted into a multiplier against
    /// the baseline price. That keeps the multiplier independent of age and
    /// of the order in which the two decays are applied.
    LinearToCap {
        cap: u64,
        loss_at_cap: f64,
        tail_amount: f64,
        tail_interval: u64,
    },

    /// Per-chunk retention that softens as mileage grows, frozen past the
    /// last tier's upper bound
    Segmented { chunk_size: u64, tiers: Vec<MileageTier> },
}

/// Retention for the mileage between the previous tier's bound and `upper_bound`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageTier {
    pub upper_bound: u64,
    pub retention_per_chunk: f64,

    /// Overrides the policy's chunk size inside this tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u64>,
}

impl MileageTier {
    pub fn new(upper_bound: u64, retention_per_chunk: f64) -> Self {
        Self { upper_bound, retention_per_chunk, chunk_size: None }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}

impl Default for MileagePolicy {
    fn default() -> Self {
        Self::segmented_default()
    }
}

impl MileagePolicy {
    /// Half the value gone at 500,000, then 10,000 per further 50,000
    pub fn linear_default() -> Self {
        MileagePolicy::LinearToCap {
            cap: 500_000,
            loss_at_cap: 0.50,
            tail_amount: 10_000.0,
            tail_interval: 50_000,
        }
    }

    /// 1.5% per 10,000 up to 100,000; 0.8% per 10,000 up to 1,000,000;
    /// 0.05% per 1,000,000 up to 2,000,000; nothing after that
    pub fn segmented_default() -> Self {
        MileagePolicy::Segmented {
            chunk_size: 10_000,
            tiers: vec![
                MileageTier::new(100_000, 0.985),
                MileageTier::new(1_000_000, 0.992),
                MileageTier::new(2_000_000, 0.9995).with_chunk_size(1_000_000),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            MileagePolicy::LinearToCap { cap, loss_at_cap, tail_amount, tail_interval } => {
                if *cap == 0 {
                    return Err(PricingError::InvalidConfig(
                        "linear mileage cap must be positive".to_string(),
                    ));
                }
                if !(loss_at_cap.is_finite() && (0.0..=1.0).contains(loss_at_cap)) {
                    return Err(PricingError::InvalidConfig(format!(
                        "loss at cap must be in [0, 1], got {}",
                        loss_at_cap
                    )));
                }
                if !(tail_amount.is_finite() && *tail_amount >= 0.0) {
                    return Err(PricingError::InvalidConfig(format!(
                        "tail amount must be non-negative, got {}",
                        tail_amount
                    )));
                }
                if *tail_interval == 0 {
                    return Err(PricingError::InvalidConfig(
                        "tail interval must be positive".to_string(),
                    ));
                }
                Ok(())
            }
            MileagePolicy::Segmented { chunk_size, tiers } => {
                if *chunk_size == 0 {
                    return Err(PricingError::InvalidConfig(
                        "chunk size must be positive".to_string(),
                    ));
                }
                if tiers.is_empty() {
                    return Err(PricingError::InvalidConfig(
                        "segmented mileage policy needs at least one tier".to_string(),
                    ));
                }
                let mut lower = 0u64;
                for (i, tier) in tiers.iter().enumerate() {
                    check_retention("mileage retention", tier.retention_per_chunk)?;
                    if tier.upper_bound <= lower {
                        return Err(PricingError::InvalidConfig(format!(
                            "mileage tier {} upper bound {} must exceed {}",
                            i, tier.upper_bound, lower
                        )));
                    }
                    if tier.chunk_size == Some(0) {
                        return Err(PricingError::InvalidConfig(format!(
                            "mileage tier {} chunk size must be positive",
                            i
                        )));
                    }
                    lower = tier.upper_bound;
                }
                Ok(())
            }
        }
    }

    /// Mileage past which no further decay accrues, if the policy has one
    pub fn ceiling(&self) -> Option<u64> {
        match self {
            MileagePolicy::LinearToCap { .. } => None,
            MileagePolicy::Segmented { tiers, .. } => tiers.last().map(|tier| tier.upper_bound),
        }
    }

    /// Multiplier for `mileage`. `baseline` is only read by the linear tail.
    pub fn multiplier(&self, mileage: u64, baseline: f64) -> f64 {
        match self {
            MileagePolicy::LinearToCap { cap, loss_at_cap, tail_amount, tail_interval } => {
                if mileage <= *cap {
                    return 1.0 - (mileage as f64 / *cap as f64) * loss_at_cap;
                }
                let at_cap = 1.0 - loss_at_cap;
                let tail = if baseline > 0.0 {
                    let intervals = (mileage - cap) as f64 / *tail_interval as f64;
                    intervals * tail_amount / baseline
                } else {
                    0.0
                };
                (at_cap - tail).max(0.0)
            }
            MileagePolicy::Segmented { chunk_size, tiers } => {
                let mut factor = 1.0;
                let mut lower = 0u64;
                for tier in tiers {
                    if mileage <= lower {
                        break;
                    }
                    let upper = mileage.min(tier.upper_bound);
                    let chunk = tier.chunk_size.unwrap_or(*chunk_size);
                    // Fractional chunk count keeps the curve continuous at tier bounds
                    let chunks = (upper - lower) as f64 / chunk as f64;
                    factor *= tier.retention_per_chunk.powf(chunks);
                    lower = tier.upper_bound;
                }
                factor
            }
        }
    }
}
