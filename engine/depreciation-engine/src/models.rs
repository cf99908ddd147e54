use crate::config::DecayOrder;
use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};

/// A single pricing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleQuote {
    pub brand: String,
    pub model: String,
    /// Whole years since first registration
    pub age_years: i64,
    pub mileage: i64,
    /// Only read by the zero-point estimator
    pub power_hp: u32,
}

impl VehicleQuote {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        age_years: i64,
        mileage: i64,
        power_hp: u32,
    ) -> Self {
        Self { brand: brand.into(), model: model.into(), age_years, mileage, power_hp }
    }

    /// The same vehicle, factory fresh
    pub fn zero_point(&self) -> Self {
        Self { age_years: 0, mileage: 0, ..self.clone() }
    }
}

/// Spread of the member predictions of an ensemble regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSpread {
    pub members: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// 5th percentile
    pub p5: f64,
    /// 95th percentile
    pub p95: f64,
}

impl EnsembleSpread {
    /// Summarize per-member predictions
    pub fn from_predictions(predictions: &[f64]) -> Result<Self> {
        if predictions.is_empty() {
            return Err(PricingError::Estimator("ensemble produced no predictions".to_string()));
        }
        if let Some(bad) = predictions.iter().find(|p| !p.is_finite()) {
            return Err(PricingError::Estimator(format!("non-finite member prediction {}", bad)));
        }

        let n = predictions.len() as f64;
        let mean = predictions.iter().sum::<f64>() / n;
        let variance = predictions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = predictions.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            members: predictions.len(),
            mean,
            std_dev: variance.sqrt(),
            p5: percentile(&sorted, 5.0),
            p95: percentile(&sorted, 95.0),
        })
    }
}

/// Linear interpolation between the closest ranks of an ascending slice
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// What the zero-point estimator says a vehicle is worth new
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEstimate {
    pub price: f64,
    pub spread: Option<EnsembleSpread>,
}

impl BaselineEstimate {
    pub fn point(price: f64) -> Self {
        Self { price, spread: None }
    }

    /// Baseline is the ensemble mean
    pub fn from_ensemble(predictions: &[f64]) -> Result<Self> {
        let spread = EnsembleSpread::from_predictions(predictions)?;
        Ok(Self { price: spread.mean, spread: Some(spread) })
    }
}

/// Itemized result of one depreciation computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationBreakdown {
    pub baseline_price: f64,
    pub final_price: f64,
    pub age_loss: f64,
    pub mileage_loss: f64,
    pub age_multiplier: f64,
    pub mileage_multiplier: f64,
    pub decay_order: DecayOrder,
    pub floor: f64,
    /// The computed price did not exceed `floor`, so the result is the floor
    pub floor_applied: bool,
}

impl DepreciationBreakdown {
    pub fn total_loss(&self) -> f64 {
        self.baseline_price - self.final_price
    }

    /// `baseline * age_multiplier * mileage_multiplier` before the floor
    pub fn unclamped_price(&self) -> f64 {
        self.baseline_price * self.age_multiplier * self.mileage_multiplier
    }

    /// Price after the first decay in `decay_order`
    pub fn intermediate_price(&self) -> f64 {
        match self.decay_order {
            DecayOrder::AgeFirst => self.baseline_price * self.age_multiplier,
            DecayOrder::MileageFirst => self.baseline_price * self.mileage_multiplier,
        }
    }

    /// Scale another price the same way the baseline was scaled
    pub fn depreciate(&self, price: f64) -> f64 {
        (price * self.age_multiplier * self.mileage_multiplier).max(self.floor)
    }
}

/// Full answer to a quote: estimate, breakdown and an optional price band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReport {
    pub quote: VehicleQuote,
    pub estimate: BaselineEstimate,
    pub breakdown: DepreciationBreakdown,
}

impl PriceReport {
    /// 90% band of the ensemble, depreciated like the baseline
    pub fn price_band(&self) -> Option<(f64, f64)> {
        self.estimate
            .spread
            .as_ref()
            .map(|spread| (self.breakdown.depreciate(spread.p5), self.breakdown.depreciate(spread.p95)))
    }

    pub fn final_price(&self) -> f64 {
        self.breakdown.final_price
    }
}
