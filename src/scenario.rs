//! Joint probability of a partial assignment of region outcomes.
//!
//! A [`ScenarioSelection`] pins some regions to [`RegionOutcome::Win`] or
//! [`RegionOutcome::Lose`] and leaves the rest undetermined. Two views of
//! its probability are offered:
//!
//! - [`scenario_probability`]: Monte-Carlo integral over the shock,
//!   reported as a percentage.
//! - [`scenario_curve`]: the same product as a deterministic function of
//!   the shock percentile, no sampling.
//!
//! Both evaluate the scenario leg of the correlation model.

use std::collections::BTreeMap;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correlation::{conditional_win_probability, Leg};
use crate::error::ForecastError;
use crate::random::{jittered, stratified_draw};
use crate::region::Region;

/// Default number of Monte-Carlo draws of [`scenario_probability`].
pub const DEFAULT_SAMPLES: usize = 16384;

/// Number of points of a [`ScenarioCurve`]: percentiles 0..=100.
pub const CURVE_POINTS: usize = 101;

/// Selected outcome of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionOutcome {
    /// Region carried by the party whose probability the lean angle encodes.
    Win,
    /// Region carried by the other party.
    Lose,
    /// No constraint on the region.
    #[default]
    Undetermined,
}

impl RegionOutcome {
    /// Factor this outcome contributes to the joint product.
    #[inline]
    fn factor(self, state_prob: f64) -> f64 {
        match self {
            RegionOutcome::Win => state_prob,
            RegionOutcome::Lose => 1.0 - state_prob,
            RegionOutcome::Undetermined => 1.0,
        }
    }
}

impl FromStr for RegionOutcome {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" | "w" => Ok(RegionOutcome::Win),
            "lose" | "l" => Ok(RegionOutcome::Lose),
            "undetermined" | "u" | "none" => Ok(RegionOutcome::Undetermined),
            _ => Err(ForecastError::InvalidConfig {
                name: "scenario",
                reason: format!("unknown region outcome '{s}', expected win, lose or undetermined"),
            }),
        }
    }
}

impl std::fmt::Display for RegionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionOutcome::Win => write!(f, "win"),
            RegionOutcome::Lose => write!(f, "lose"),
            RegionOutcome::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// Mapping from region id to selected outcome.
///
/// Regions missing from the mapping are undetermined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioSelection {
    outcomes: BTreeMap<String, RegionOutcome>,
}

impl ScenarioSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome selected for `id`.
    pub fn get(&self, id: &str) -> RegionOutcome {
        self.outcomes.get(id).copied().unwrap_or_default()
    }

    /// Sets the outcome of `id`; `Undetermined` removes the entry.
    pub fn set(&mut self, id: impl Into<String>, outcome: RegionOutcome) {
        let id = id.into();
        if outcome == RegionOutcome::Undetermined {
            self.outcomes.remove(&id);
        } else {
            self.outcomes.insert(id, outcome);
        }
    }

    /// Selects `outcome` for `id`, or clears it if already selected.
    ///
    /// # Examples
    /// ```
    /// use needle_forecast::scenario::{RegionOutcome, ScenarioSelection};
    /// let mut sel = ScenarioSelection::new();
    /// sel.toggle("PA", RegionOutcome::Win);
    /// assert_eq!(sel.get("PA"), RegionOutcome::Win);
    /// sel.toggle("PA", RegionOutcome::Win);
    /// assert_eq!(sel.get("PA"), RegionOutcome::Undetermined);
    /// ```
    pub fn toggle(&mut self, id: impl Into<String>, outcome: RegionOutcome) -> RegionOutcome {
        let id = id.into();
        let next = if self.get(&id) == outcome {
            RegionOutcome::Undetermined
        } else {
            outcome
        };
        self.set(id, next);
        next
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }

    /// Number of regions pinned to `Win` or `Lose`.
    pub fn determined(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Pinned regions in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RegionOutcome)> {
        self.outcomes.iter().map(|(id, &o)| (id.as_str(), o))
    }
}

impl<S: Into<String>> FromIterator<(S, RegionOutcome)> for ScenarioSelection {
    fn from_iter<I: IntoIterator<Item = (S, RegionOutcome)>>(iter: I) -> Self {
        let mut sel = ScenarioSelection::new();
        for (id, outcome) in iter {
            sel.set(id, outcome);
        }
        sel
    }
}

/// Joint scenario probability as a function of shock percentile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScenarioCurve {
    points: Vec<f64>,
}

impl ScenarioCurve {
    /// Value at percentile `k` (0..=100).
    pub fn get(&self, percentile: usize) -> Option<f64> {
        self.points.get(percentile).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// `(p, correlation, outcome)` per region, in caller order.
fn resolve(regions: &[Region], selection: &ScenarioSelection) -> Vec<(f64, f64, RegionOutcome)> {
    regions
        .iter()
        .map(|r| (r.win_probability(), r.correlation(), selection.get(r.id())))
        .collect()
}

/// Monte-Carlo estimate of the scenario probability, in percent.
///
/// Draw `i` takes a base shock `(i + U) / samples`; every region then adds
/// its own jitter `U' / samples`. Each region contributes `P` (win),
/// `1 − P` (lose) or `1` (undetermined) to the draw's product, where `P`
/// is its conditional win probability. The products are averaged and
/// scaled to [0, 100].
///
/// Returns 0 when `regions` is empty or `samples` is 0.
///
/// # Examples
/// ```
/// use needle_forecast::random::create_rng;
/// use needle_forecast::region::Region;
/// use needle_forecast::scenario::{scenario_probability, RegionOutcome, ScenarioSelection};
///
/// let regions = vec![Region::new("AK", 3, 90.0, 0.5).unwrap()];
/// let sel: ScenarioSelection = [("AK", RegionOutcome::Win)].into_iter().collect();
/// let pct = scenario_probability(&regions, &sel, 1024, &mut create_rng(1));
/// assert!((pct - 100.0).abs() < 1e-9);
/// ```
pub fn scenario_probability<R: Rng + ?Sized>(
    regions: &[Region],
    selection: &ScenarioSelection,
    samples: usize,
    rng: &mut R,
) -> f64 {
    if regions.is_empty() || samples == 0 {
        return 0.0;
    }

    let params = resolve(regions, selection);
    let mut integral = 0.0;
    for i in 0..samples {
        let base = stratified_draw(i, samples, rng);
        let mut product = 1.0;
        for &(p, correlation, outcome) in &params {
            // Drawn for every region so the stream does not depend on the selection.
            let shock = jittered(base, samples, rng);
            let state_prob = conditional_win_probability(shock, p, correlation, Leg::Scenario);
            product *= outcome.factor(state_prob);
        }
        integral += product;
    }

    let pct = integral / samples as f64 * 100.0;
    debug!(
        regions = regions.len(),
        determined = selection.determined(),
        samples,
        probability = pct,
        "evaluated scenario probability"
    );
    pct
}

/// Deterministic scenario product at shock percentiles 0, 1, …, 100.
///
/// An empty region list is the empty product: 1 at every percentile.
///
/// # Examples
/// ```
/// use needle_forecast::region::Region;
/// use needle_forecast::scenario::{scenario_curve, RegionOutcome, ScenarioSelection};
///
/// let regions = vec![Region::new("GA", 16, 0.0, 0.5).unwrap()];
/// let sel: ScenarioSelection = [("GA", RegionOutcome::Win)].into_iter().collect();
/// let curve = scenario_curve(&regions, &sel);
/// assert_eq!(curve.len(), 101);
/// assert_eq!(curve.get(0), Some(0.0));
/// assert_eq!(curve.get(100), Some(1.0));
/// ```
pub fn scenario_curve(regions: &[Region], selection: &ScenarioSelection) -> ScenarioCurve {
    let params = resolve(regions, selection);
    let points = (0..CURVE_POINTS)
        .map(|k| {
            let shock = k as f64 / (CURVE_POINTS - 1) as f64;
            params
                .iter()
                .map(|&(p, correlation, outcome)| {
                    outcome.factor(conditional_win_probability(shock, p, correlation, Leg::Scenario))
                })
                .product()
        })
        .collect();
    ScenarioCurve { points }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn probability_is_a_percentage(
            seed in 0_u64..10000,
            angle in -90.0_f64..=90.0,
            rho in 0.0_f64..0.95,
            win in proptest::bool::ANY,
        ) {
            let regions = vec![Region::new("X", 4, angle, rho).unwrap()];
            let outcome = if win { RegionOutcome::Win } else { RegionOutcome::Lose };
            let sel: ScenarioSelection = [("X", outcome)].into_iter().collect();
            let pct = scenario_probability(&regions, &sel, 256, &mut create_rng(seed));
            prop_assert!((-1e-4..=100.0 + 1e-4).contains(&pct), "pct = {pct}");
        }

        #[test]
        fn win_and_lose_are_complementary(
            seed in 0_u64..10000,
            angle in -90.0_f64..=90.0,
            rho in 0.0_f64..0.95,
        ) {
            let regions = vec![Region::new("X", 4, angle, rho).unwrap()];
            let win: ScenarioSelection = [("X", RegionOutcome::Win)].into_iter().collect();
            let lose: ScenarioSelection = [("X", RegionOutcome::Lose)].into_iter().collect();
            let a = scenario_probability(&regions, &win, 256, &mut create_rng(seed));
            let b = scenario_probability(&regions, &lose, 256, &mut create_rng(seed));
            prop_assert!((a + b - 100.0).abs() < 1e-9);
        }
    }
}
