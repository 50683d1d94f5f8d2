//! A complete forecast: regions, baselines and an optional global
//! correlation, plus the summaries consumers read off the engine output.

use std::borrow::Cow;
use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    compute_pmfs_with, AggregationSettings, PartyPmfs, DEFAULT_DEM_BASELINE, DEFAULT_REP_BASELINE,
};
use crate::config::EngineConfig;
use crate::error::{ForecastError, Result};
use crate::region::Region;
use crate::scenario::{scenario_curve, scenario_probability, ScenarioCurve, ScenarioSelection};

/// Default win threshold: a majority of 538.
pub const DEFAULT_WIN_THRESHOLD: usize = 270;

/// The default battleground map: `(id, weight, lean angle)`.
const BATTLEGROUND: [(&str, u32, f64); 19] = [
    ("ME", 2, -54.0),
    ("NM", 5, -54.0),
    ("VA", 13, -54.0),
    ("NE-2", 1, -54.0),
    ("NH", 4, -54.0),
    ("MN", 10, -54.0),
    ("WI", 10, 0.0),
    ("MI", 15, 0.0),
    ("NV", 6, 0.0),
    ("PA", 19, 0.0),
    ("NC", 16, 0.0),
    ("GA", 16, 0.0),
    ("AZ", 11, 0.0),
    ("FL", 30, 54.0),
    ("ME-2", 1, 54.0),
    ("TX", 40, 54.0),
    ("IA", 6, 54.0),
    ("OH", 17, 54.0),
    ("AK", 3, 54.0),
];

const BATTLEGROUND_CORRELATION: f64 = 0.5;

/// Regions plus the votes already allocated outside them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    regions: Vec<Region>,
    dem_baseline: usize,
    rep_baseline: usize,
    global_correlation: Option<f64>,
}

/// Deterministic expected vote totals of both parties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedVotes {
    pub dem: f64,
    pub rep: f64,
}

/// What consumers read off a pair of PMFs.
///
/// Probabilities are fractions in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastSummary {
    /// `P(dem ≥ threshold)`.
    pub dem_win: f64,
    /// `1 − dem_win`; ties resolve to the second party.
    pub rep_win: f64,
    /// `P(dem = threshold − 1)`.
    pub tie: f64,
    /// Expected totals from the PMFs.
    pub expected: ExpectedVotes,
    /// Mass each PMF retained after truncation.
    pub dem_mass: f64,
    pub rep_mass: f64,
}

impl ForecastSummary {
    /// Summarizes `pmfs` against `threshold` votes needed to win.
    ///
    /// # Examples
    /// ```
    /// use needle_forecast::aggregate::compute_pmfs;
    /// use needle_forecast::forecast::{ForecastSummary, DEFAULT_WIN_THRESHOLD};
    /// use needle_forecast::random::create_rng;
    /// use needle_forecast::region::Region;
    ///
    /// // Everything outside one certain region is already decided.
    /// let regions = vec![Region::new("X", 225, -90.0, 0.5).unwrap()];
    /// let pmfs = compute_pmfs(&regions, 64, &mut create_rng(1));
    /// let summary = ForecastSummary::from_pmfs(&pmfs, DEFAULT_WIN_THRESHOLD);
    /// assert!((summary.dem_win - 1.0).abs() < 1e-12);
    /// ```
    pub fn from_pmfs(pmfs: &PartyPmfs, threshold: usize) -> Self {
        let dem_win = pmfs.dem.probability_at_least(threshold);
        let tie = threshold.checked_sub(1).map_or(0.0, |k| pmfs.dem.get(k));
        Self {
            dem_win,
            rep_win: 1.0 - dem_win,
            tie,
            expected: ExpectedVotes {
                dem: pmfs.dem.mean(),
                rep: pmfs.rep.mean(),
            },
            dem_mass: pmfs.dem.total_mass(),
            rep_mass: pmfs.rep.total_mass(),
        }
    }
}

/// Fraction to percentage.
#[inline]
pub fn percent(fraction: f64) -> f64 {
    fraction * 100.0
}

impl Forecast {
    /// Creates a forecast with the default baselines.
    ///
    /// # Errors
    /// Returns [`ForecastError::DuplicateRegion`] if two regions share an id.
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(regions.len());
        for r in &regions {
            if !seen.insert(r.id()) {
                return Err(ForecastError::DuplicateRegion(r.id().to_string()));
            }
        }
        Ok(Self {
            regions,
            dem_baseline: DEFAULT_DEM_BASELINE,
            rep_baseline: DEFAULT_REP_BASELINE,
            global_correlation: None,
        })
    }

    /// The 19-region battleground map with correlation 0.5 everywhere.
    ///
    /// # Examples
    /// ```
    /// use needle_forecast::forecast::Forecast;
    /// let f = Forecast::battleground();
    /// assert_eq!(f.regions().len(), 19);
    /// assert_eq!(f.total_votes(), 538);
    /// ```
    pub fn battleground() -> Self {
        let regions = BATTLEGROUND
            .iter()
            .map(|&(id, weight, lean)| Region::from_trusted(id, weight, lean, BATTLEGROUND_CORRELATION))
            .collect();
        Self {
            regions,
            dem_baseline: DEFAULT_DEM_BASELINE,
            rep_baseline: DEFAULT_REP_BASELINE,
            global_correlation: None,
        }
    }

    /// Replaces both baselines.
    pub fn with_baselines(mut self, dem_baseline: usize, rep_baseline: usize) -> Self {
        self.dem_baseline = dem_baseline;
        self.rep_baseline = rep_baseline;
        self
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn dem_baseline(&self) -> usize {
        self.dem_baseline
    }

    pub fn rep_baseline(&self) -> usize {
        self.rep_baseline
    }

    pub fn global_correlation(&self) -> Option<f64> {
        self.global_correlation
    }

    /// Baselines plus every region's weight.
    pub fn total_votes(&self) -> usize {
        self.dem_baseline
            + self.rep_baseline
            + self.regions.iter().map(|r| r.weight() as usize).sum::<usize>()
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id() == id)
    }

    fn region_mut(&mut self, id: &str) -> Result<&mut Region> {
        self.regions
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| ForecastError::UnknownRegion(id.to_string()))
    }

    pub fn set_lean_angle(&mut self, id: &str, lean_angle: f64) -> Result<()> {
        self.region_mut(id)?.set_lean_angle(lean_angle)
    }

    pub fn set_probability(&mut self, id: &str, probability: f64) -> Result<()> {
        self.region_mut(id)?.set_probability(probability)
    }

    pub fn set_correlation(&mut self, id: &str, correlation: f64) -> Result<()> {
        self.region_mut(id)?.set_correlation(correlation)
    }

    /// Sets or clears the correlation that overrides every region's own.
    ///
    /// # Errors
    /// Rejects values outside [0, 1].
    pub fn set_global_correlation(&mut self, correlation: Option<f64>) -> Result<()> {
        if let Some(c) = correlation {
            if !c.is_finite() || !(0.0..=1.0).contains(&c) {
                return Err(ForecastError::InvalidConfig {
                    name: "global_correlation",
                    reason: format!("must be in [0, 1], got {c}"),
                });
            }
        }
        self.global_correlation = correlation;
        Ok(())
    }

    /// Regions as the engine sees them, with the global override applied.
    pub fn effective_regions(&self) -> Cow<'_, [Region]> {
        match self.global_correlation {
            None => Cow::Borrowed(&self.regions),
            // `c` was validated by `set_global_correlation`.
            Some(c) => Cow::Owned(
                self.regions
                    .iter()
                    .map(|r| Region::from_trusted(r.id(), r.weight(), r.lean_angle(), c))
                    .collect(),
            ),
        }
    }

    /// Expected totals straight from the marginal probabilities.
    ///
    /// `dem = baseline + Σ w·(1 − p)`, `rep = baseline + Σ w·p`.
    pub fn expected_votes(&self) -> ExpectedVotes {
        let mut dem = self.dem_baseline as f64;
        let mut rep = self.rep_baseline as f64;
        for r in &self.regions {
            let p = r.win_probability();
            let w = r.weight() as f64;
            rep += w * p;
            dem += w * (1.0 - p);
        }
        ExpectedVotes { dem, rep }
    }

    /// Checks that every pinned region in `selection` exists.
    ///
    /// # Errors
    /// Returns [`ForecastError::UnknownRegion`] for the first unknown id.
    pub fn check_selection(&self, selection: &ScenarioSelection) -> Result<()> {
        for (id, _) in selection.iter() {
            if self.region(id).is_none() {
                return Err(ForecastError::UnknownRegion(id.to_string()));
            }
        }
        Ok(())
    }

    /// Aggregation settings for this forecast under `config`.
    pub fn aggregation_settings(&self, config: &EngineConfig) -> AggregationSettings {
        AggregationSettings {
            num_strata: config.num_strata,
            outcome_space: config.outcome_space,
            dem_baseline: self.dem_baseline,
            rep_baseline: self.rep_baseline,
        }
    }

    /// Runs the aggregation on the effective regions.
    pub fn compute_pmfs<R: Rng + ?Sized>(&self, config: &EngineConfig, rng: &mut R) -> PartyPmfs {
        let regions = self.effective_regions();
        compute_pmfs_with(&regions, &self.aggregation_settings(config), rng)
    }

    /// Runs the aggregation and summarizes it against the configured threshold.
    pub fn summarize<R: Rng + ?Sized>(&self, config: &EngineConfig, rng: &mut R) -> (PartyPmfs, ForecastSummary) {
        let pmfs = self.compute_pmfs(config, rng);
        let summary = ForecastSummary::from_pmfs(&pmfs, config.win_threshold);
        debug!(
            dem_win = summary.dem_win,
            tie = summary.tie,
            threshold = config.win_threshold,
            "summarized forecast"
        );
        (pmfs, summary)
    }

    /// Scenario probability (percent) on the effective regions.
    pub fn scenario_probability<R: Rng + ?Sized>(
        &self,
        selection: &ScenarioSelection,
        config: &EngineConfig,
        rng: &mut R,
    ) -> f64 {
        let regions = self.effective_regions();
        scenario_probability(&regions, selection, config.samples, rng)
    }

    /// Scenario curve on the effective regions.
    pub fn scenario_curve(&self, selection: &ScenarioSelection) -> ScenarioCurve {
        let regions = self.effective_regions();
        scenario_curve(&regions, selection)
    }
}
