//! Engine settings and the TOML forecast file.
//!
//! ```toml
//! dem_baseline = 191
//! rep_baseline = 122
//! # global_correlation = 0.7
//!
//! [engine]
//! num_strata = 1024
//! samples = 16384
//! seed = 42
//!
//! [[regions]]
//! id = "PA"
//! weight = 19
//! lean_angle = 0.0
//! correlation = 0.5
//!
//! [[regions]]
//! id = "GA"
//! weight = 16
//! probability = 0.55
//!
//! [scenario]
//! PA = "win"
//! ```
//!
//! Every field is optional except the region `id` and `weight`; a region
//! gives either `lean_angle` or `probability`, not both.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{DEFAULT_DEM_BASELINE, DEFAULT_NUM_STRATA, DEFAULT_REP_BASELINE};
use crate::error::{ForecastError, Result};
use crate::forecast::{Forecast, DEFAULT_WIN_THRESHOLD};
use crate::outcome::DEFAULT_OUTCOME_SPACE;
use crate::region::Region;
use crate::scenario::{RegionOutcome, ScenarioSelection, DEFAULT_SAMPLES};

/// Correlation of a region that does not state one.
pub const DEFAULT_CORRELATION: f64 = 0.5;

/// Knobs of the numerical engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Strata of the PMF aggregation.
    pub num_strata: usize,
    /// Draws of the scenario estimate.
    pub samples: usize,
    /// PMF length.
    pub outcome_space: usize,
    /// Votes needed to win; `win_threshold − 1` is the tie index.
    pub win_threshold: usize,
    /// Generator seed; `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_strata: DEFAULT_NUM_STRATA,
            samples: DEFAULT_SAMPLES,
            outcome_space: DEFAULT_OUTCOME_SPACE,
            win_threshold: DEFAULT_WIN_THRESHOLD,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Checks the settings.
    ///
    /// # Errors
    /// Returns [`ForecastError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.num_strata == 0 {
            return Err(invalid_config("num_strata", "must be positive".to_string()));
        }
        if self.samples == 0 {
            return Err(invalid_config("samples", "must be positive".to_string()));
        }
        if self.outcome_space == 0 {
            return Err(invalid_config("outcome_space", "must be positive".to_string()));
        }
        if self.win_threshold == 0 || self.win_threshold >= self.outcome_space {
            return Err(invalid_config(
                "win_threshold",
                format!(
                    "must be in 1..{}, got {}",
                    self.outcome_space, self.win_threshold
                ),
            ));
        }
        Ok(())
    }
}

fn invalid_config(name: &'static str, reason: String) -> ForecastError {
    ForecastError::InvalidConfig { name, reason }
}

/// One `[[regions]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionRecord {
    pub id: String,
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lean_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default = "default_correlation")]
    pub correlation: f64,
}

fn default_correlation() -> f64 {
    DEFAULT_CORRELATION
}

impl RegionRecord {
    /// Builds the validated region.
    ///
    /// # Errors
    /// Returns [`ForecastError::InvalidRegion`] when neither or both of
    /// `lean_angle` and `probability` are set, or a value is out of range.
    pub fn to_region(&self) -> Result<Region> {
        match (self.lean_angle, self.probability) {
            (Some(angle), None) => Region::new(self.id.as_str(), self.weight, angle, self.correlation),
            (None, Some(p)) => Region::with_probability(self.id.as_str(), self.weight, p, self.correlation),
            (Some(_), Some(_)) => Err(ForecastError::InvalidRegion {
                id: self.id.clone(),
                reason: "set either lean_angle or probability, not both".to_string(),
            }),
            (None, None) => Err(ForecastError::InvalidRegion {
                id: self.id.clone(),
                reason: "missing lean_angle or probability".to_string(),
            }),
        }
    }
}

impl From<&Region> for RegionRecord {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id().to_string(),
            weight: region.weight(),
            lean_angle: Some(region.lean_angle()),
            probability: None,
            correlation: region.correlation(),
        }
    }
}

/// A forecast file as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastFile {
    #[serde(default = "default_dem_baseline")]
    pub dem_baseline: usize,
    #[serde(default = "default_rep_baseline")]
    pub rep_baseline: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_correlation: Option<f64>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scenario: BTreeMap<String, RegionOutcome>,
}

fn default_dem_baseline() -> usize {
    DEFAULT_DEM_BASELINE
}

fn default_rep_baseline() -> usize {
    DEFAULT_REP_BASELINE
}

/// Everything a validated forecast file yields.
#[derive(Debug, Clone)]
pub struct LoadedForecast {
    pub forecast: Forecast,
    pub engine: EngineConfig,
    pub selection: ScenarioSelection,
}

impl FromStr for ForecastFile {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl ForecastFile {
    /// Reads and parses a forecast file without validating it.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let file: Self = text.parse()?;
        debug!(path = %path.display(), regions = file.regions.len(), "read forecast file");
        Ok(file)
    }

    /// Snapshot of a forecast and its engine settings.
    pub fn from_forecast(forecast: &Forecast, engine: EngineConfig, selection: &ScenarioSelection) -> Self {
        Self {
            dem_baseline: forecast.dem_baseline(),
            rep_baseline: forecast.rep_baseline(),
            global_correlation: forecast.global_correlation(),
            engine,
            regions: forecast.regions().iter().map(RegionRecord::from).collect(),
            scenario: selection.iter().map(|(id, o)| (id.to_string(), o)).collect(),
        }
    }

    /// Validates the file and builds the forecast.
    ///
    /// # Errors
    /// - [`ForecastError::InvalidConfig`] for bad engine settings, baselines
    ///   outside the outcome space or an out-of-range global correlation.
    /// - [`ForecastError::InvalidRegion`] for a bad region entry.
    /// - [`ForecastError::DuplicateRegion`] if two entries share an id.
    /// - [`ForecastError::UnknownRegion`] if the scenario names a missing id.
    pub fn into_forecast(self) -> Result<LoadedForecast> {
        self.engine.validate()?;
        for (name, baseline) in [("dem_baseline", self.dem_baseline), ("rep_baseline", self.rep_baseline)] {
            if baseline >= self.engine.outcome_space {
                return Err(invalid_config(
                    name,
                    format!(
                        "{baseline} is outside the outcome space 0..{}",
                        self.engine.outcome_space
                    ),
                ));
            }
        }

        let mut seen = HashSet::with_capacity(self.regions.len());
        let mut regions = Vec::with_capacity(self.regions.len());
        for record in &self.regions {
            if !seen.insert(record.id.as_str()) {
                return Err(ForecastError::DuplicateRegion(record.id.clone()));
            }
            regions.push(record.to_region()?);
        }

        let mut forecast = Forecast::new(regions)?.with_baselines(self.dem_baseline, self.rep_baseline);
        forecast.set_global_correlation(self.global_correlation)?;

        let selection: ScenarioSelection = self.scenario.into_iter().collect();
        forecast.check_selection(&selection)?;

        debug!(
            regions = forecast.regions().len(),
            total_votes = forecast.total_votes(),
            pinned = selection.determined(),
            "loaded forecast"
        );
        Ok(LoadedForecast {
            forecast,
            engine: self.engine,
            selection,
        })
    }
}

/// Reads, parses and validates a forecast file.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedForecast> {
    ForecastFile::read(path)?.into_forecast()
}
