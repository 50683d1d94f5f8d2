//! CLI error types

use needle_forecast::ForecastError;
use thiserror::Error;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Forecast could not be loaded or updated
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Output could not be encoded
    #[error("cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type
pub type Result<T> = std::result::Result<T, CliError>;
