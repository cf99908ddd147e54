use crate::config::{DecayOrder, PricingConfig};
use crate::error::{PricingError, Result};
use crate::estimator::ZeroPointEstimator;
use crate::models::{DepreciationBreakdown, PriceReport, VehicleQuote};
use tracing::{debug, info};

/// Applies age and mileage decay to a zero-point price.
///
/// The engine holds nothing but a validated configuration, so it can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct DepreciationEngine {
    config: PricingConfig,
}

impl DepreciationEngine {
    /// Create an engine after validating `config`
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Depreciation engine ready (floor: {}, order: {:?})",
            config.floor, config.decay_order
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Age multiplier for `age` years under the configured policy
    pub fn age_multiplier(&self, age: i64) -> Result<f64> {
        let age = check_age(age)?;
        Ok(self.config.age_policy.multiplier(age))
    }

    /// Mileage multiplier under the configured policy
    pub fn mileage_multiplier(&self, mileage: i64, baseline_price: f64) -> Result<f64> {
        let mileage = check_mileage(mileage)?;
        let baseline_price = check_baseline(baseline_price)?;
        Ok(self.config.mileage_policy.multiplier(mileage, baseline_price))
    }

    /// Depreciate `baseline_price` for a vehicle of `age` years and `mileage` units.
    ///
    /// All inputs are validated before anything is computed.
    pub fn price(&self, baseline_price: f64, age: i64, mileage: i64) -> Result<DepreciationBreakdown> {
        let baseline = check_baseline(baseline_price)?;
        let age = check_age(age)?;
        let mileage = check_mileage(mileage)?;

        let age_multiplier = self.config.age_policy.multiplier(age);
        let mileage_multiplier = self.config.mileage_policy.multiplier(mileage, baseline);

        let unclamped = baseline * age_multiplier * mileage_multiplier;
        let floor = self.config.floor;
        let floor_applied = unclamped <= floor;
        let final_price = unclamped.max(floor);

        let (age_loss, mileage_loss) = match self.config.decay_order {
            DecayOrder::AgeFirst => {
                let after_age = baseline * age_multiplier;
                (baseline - after_age, after_age - final_price)
            }
            DecayOrder::MileageFirst => {
                let after_mileage = baseline * mileage_multiplier;
                (after_mileage - final_price, baseline - after_mileage)
            }
        };

        if floor_applied {
            info!(
                "Price {:.2} held at floor {:.2} (age: {}, mileage: {})",
                unclamped, floor, age, mileage
            );
        }
        if let Some(ceiling) = self.config.mileage_policy.ceiling() {
            if mileage > ceiling {
                debug!("Mileage {} is past the {} ceiling, decay frozen", mileage, ceiling);
            }
        }
        debug!(
            "Depreciated {:.2} -> {:.2} (age x{:.4}, mileage x{:.4}, age loss {:.2}, mileage loss {:.2})",
            baseline, final_price, age_multiplier, mileage_multiplier, age_loss, mileage_loss
        );

        Ok(DepreciationBreakdown {
            baseline_price: baseline,
            final_price,
            age_loss,
            mileage_loss,
            age_multiplier,
            mileage_multiplier,
            decay_order: self.config.decay_order,
            floor,
            floor_applied,
        })
    }

    /// Ask `estimator` for the zero-point price of `quote`, then depreciate it
    pub fn quote<E>(&self, estimator: &E, quote: &VehicleQuote) -> Result<PriceReport>
    where
        E: ZeroPointEstimator + ?Sized,
    {
        check_age(quote.age_years)?;
        check_mileage(quote.mileage)?;

        let estimate = estimator.estimate(&quote.zero_point())?;
        debug!(
            "Zero-point estimate for {} {} ({} HP): {:.2}",
            quote.brand, quote.model, quote.power_hp, estimate.price
        );

        let breakdown = self.price(estimate.price, quote.age_years, quote.mileage)?;
        Ok(PriceReport { quote: quote.clone(), estimate, breakdown })
    }

    /// One breakdown per age from 0 to `max_age` at a fixed mileage
    pub fn schedule(
        &self,
        baseline_price: f64,
        mileage: i64,
        max_age: u32,
    ) -> Result<Vec<DepreciationBreakdown>> {
        (0..=max_age)
            .map(|age| self.price(baseline_price, i64::from(age), mileage))
            .collect()
    }
}

fn check_baseline(baseline_price: f64) -> Result<f64> {
    if baseline_price.is_finite() && baseline_price >= 0.0 {
        Ok(baseline_price)
    } else {
        Err(PricingError::invalid_input("baseline_price", baseline_price))
    }
}

fn check_age(age: i64) -> Result<u32> {
    u32::try_from(age).map_err(|_| PricingError::invalid_input("age_years", age))
}

fn check_mileage(mileage: i64) -> Result<u64> {
    u64::try_from(mileage).map_err(|_| PricingError::invalid_input("mileage", mileage))
}
