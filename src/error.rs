//! Error types for forecast construction and configuration.
//!
//! The numerical engine itself is infallible. Errors only arise where
//! caller-supplied data enters the crate: region construction, forecast
//! mutation and forecast-file loading.

use thiserror::Error;

/// Errors raised while building or loading a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A region violates its domain constraints.
    #[error("invalid region '{id}': {reason}")]
    InvalidRegion {
        /// Region identifier as supplied.
        id: String,
        /// Which constraint failed.
        reason: String,
    },

    /// Two regions share the same identifier.
    #[error("duplicate region id '{0}'")]
    DuplicateRegion(String),

    /// A selection or update names a region that does not exist.
    #[error("unknown region id '{0}'")]
    UnknownRegion(String),

    /// An engine or forecast setting is out of range.
    #[error("invalid setting '{name}': {reason}")]
    InvalidConfig {
        /// Setting name.
        name: &'static str,
        /// Description of the invalid value.
        reason: String,
    },

    /// Forecast file could not be read.
    #[error("cannot read forecast file: {0}")]
    Io(#[from] std::io::Error),

    /// Forecast file is not valid TOML for the expected layout.
    #[error("cannot parse forecast file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ForecastError>;
