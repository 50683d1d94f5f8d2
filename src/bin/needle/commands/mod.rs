//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

use std::path::Path;

use needle_forecast::config::{self, EngineConfig, LoadedForecast};
use needle_forecast::forecast::Forecast;
use needle_forecast::scenario::ScenarioSelection;
use tracing::info;

use crate::Result;

pub mod pmf;
pub mod regions;
pub mod scenario;

/// Loads `path`, or the battleground map with default settings.
fn load_forecast(path: Option<&Path>) -> Result<LoadedForecast> {
    match path {
        Some(path) => {
            info!("Loading forecast from {}", path.display());
            Ok(config::load(path)?)
        }
        None => {
            info!("Using built-in battleground forecast");
            Ok(LoadedForecast {
                forecast: Forecast::battleground(),
                engine: EngineConfig::default(),
                selection: ScenarioSelection::new(),
            })
        }
    }
}
