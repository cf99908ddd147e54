//! Zero-point price estimation
//!
//! The engine never trains or runs a regressor itself. Anything that can say
//! what a vehicle would cost with zero age and zero mileage plugs in through
//! [`ZeroPointEstimator`]. [`PriceTable`] is a lookup-backed implementation
//! for tools and tests.

use crate::error::{PricingError, Result};
use crate::models::{BaselineEstimate, VehicleQuote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Source of as-new prices
pub trait ZeroPointEstimator {
    /// Price `quote` as if it were factory fresh. Callers pass a quote with
    /// age and mileage already set to zero.
    fn estimate(&self, quote: &VehicleQuote) -> Result<BaselineEstimate>;
}

impl<F> ZeroPointEstimator for F
where
    F: Fn(&VehicleQuote) -> Result<BaselineEstimate>,
{
    fn estimate(&self, quote: &VehicleQuote) -> Result<BaselineEstimate> {
        self(quote)
    }
}

/// One row of a price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub brand: String,
    pub model: String,
    pub power_hp: u32,
    /// One price, or one prediction per ensemble member
    pub prices: Vec<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PriceTableFile {
    #[serde(default)]
    vehicles: Vec<PriceEntry>,
}

type VehicleKey = (String, String, u32);

/// As-new prices keyed by brand, model and engine power.
///
/// Brand and model are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    entries: BTreeMap<VehicleKey, Vec<f64>>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, rejecting duplicates and bad prices
    pub fn insert(&mut self, entry: PriceEntry) -> Result<()> {
        if entry.prices.is_empty() {
            return Err(PricingError::InvalidConfig(format!(
                "{} {} ({} HP) has no prices",
                entry.brand, entry.model, entry.power_hp
            )));
        }
        if let Some(bad) = entry.prices.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
            return Err(PricingError::InvalidConfig(format!(
                "{} {} ({} HP) has invalid price {}",
                entry.brand, entry.model, entry.power_hp, bad
            )));
        }

        let key = (normalize(&entry.brand), normalize(&entry.model), entry.power_hp);
        if self.entries.contains_key(&key) {
            return Err(PricingError::InvalidConfig(format!(
                "duplicate price entry for {} {} ({} HP)",
                entry.brand, entry.model, entry.power_hp
            )));
        }
        self.entries.insert(key, entry.prices);
        Ok(())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = PriceEntry>) -> Result<Self> {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: PriceTableFile = toml::from_str(content)?;
        Self::from_entries(file.vehicles)
    }

    /// Load a table of `[[vehicles]]` entries from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&content)?;
        info!("Loaded {} price entries from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All brands, sorted
    pub fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.entries.keys().map(|(brand, _, _)| brand.clone()).collect();
        brands.dedup();
        brands
    }

    /// Models of `brand`, sorted
    pub fn models(&self, brand: &str) -> Vec<String> {
        let brand = normalize(brand);
        let mut models: Vec<String> = self
            .entries
            .keys()
            .filter(|(b, _, _)| *b == brand)
            .map(|(_, model, _)| model.clone())
            .collect();
        models.dedup();
        models
    }

    /// Engine powers offered for `brand` `model`, ascending
    pub fn powers(&self, brand: &str, model: &str) -> Vec<u32> {
        let (brand, model) = (normalize(brand), normalize(model));
        self.entries
            .keys()
            .filter(|(b, m, _)| *b == brand && *m == model)
            .map(|(_, _, power)| *power)
            .collect()
    }
}

impl ZeroPointEstimator for PriceTable {
    fn estimate(&self, quote: &VehicleQuote) -> Result<BaselineEstimate> {
        let key = (normalize(&quote.brand), normalize(&quote.model), quote.power_hp);
        let prices = self.entries.get(&key).ok_or_else(|| PricingError::UnknownVehicle {
            brand: quote.brand.clone(),
            model: quote.model.clone(),
            power_hp: quote.power_hp,
        })?;

        match prices.as_slice() {
            [price] => Ok(BaselineEstimate::point(*price)),
            members => BaselineEstimate::from_ensemble(members),
        }
    }
}
