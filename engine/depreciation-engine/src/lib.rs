//! # Depreciation Engine
//!
//! Prices a used vehicle from its factory-fresh ("zero-point") price.
//!
//! An external estimator supplies the price the vehicle would have with zero
//! age and zero mileage. The engine then applies two independent decay curves,
//! one over age and one over mileage, and reports the final price together with
//! how much of the loss each curve accounts for.

pub mod age;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod mileage;
pub mod models;


pub use age::{AgePolicy, AgeTier};
pub use config::{DecayOrder, PricingConfig};
pub use engine::DepreciationEngine;
pub use error::{PricingError, Result};
pub use estimator::{PriceEntry, PriceTable, ZeroPointEstimator};
pub use mileage::{MileagePolicy, MileageTier};
pub use models::*;

/// Current version of the depreciation engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default minimum final price
pub const DEFAULT_FLOOR: f64 = 0.0;
