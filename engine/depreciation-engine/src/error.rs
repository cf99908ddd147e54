//! Error types for the depreciation engine

use thiserror::Error;

/// Result type for depreciation engine operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur while configuring or running the engine
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Invalid input: {field} = {value}")]
    InvalidInput { field: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No baseline price for {brand} {model} ({power_hp} HP)")]
    UnknownVehicle { brand: String, model: String, power_hp: u32 },

    #[error("Estimator error: {0}")]
    Estimator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl PricingError {
    pub(crate) fn invalid_input(field: &'static str, value: impl ToString) -> Self {
        PricingError::InvalidInput { field, value: value.to_string() }
    }
}
