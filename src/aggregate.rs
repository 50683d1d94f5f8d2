//! Stratified Monte-Carlo aggregation of region outcomes into PMFs.
//!
//! # Algorithm
//!
//! The unit interval is split into `num_strata` equal strata. For each
//! stratum `s`, both parties start from a point mass at their baseline.
//! Every region then draws its own shock `x = (s + U) / num_strata`, with
//! `U` fresh per region, evaluates the aggregation leg of the correlation
//! model and splits the working mass between "region lost" and "region
//! won". The stratum PMFs are summed and finally divided by `num_strata`.
//!
//! Cross-region correlation therefore comes only from sharing the stratum
//! index; the per-region jitter dilutes it.
//!
//! # Truncation
//!
//! Mass that would move past the last vote total is dropped and never
//! renormalized.
//!
//! # Complexity
//! Time: O(num_strata · regions · outcome_space), Space: O(outcome_space)

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::correlation::{conditional_win_probability, Leg};
use crate::outcome::{OutcomePmf, DEFAULT_OUTCOME_SPACE};
use crate::random::stratified_draw;
use crate::region::Region;

/// Default number of strata.
pub const DEFAULT_NUM_STRATA: usize = 1024;

/// Votes held by the first party before any modeled region is counted.
pub const DEFAULT_DEM_BASELINE: usize = 191;

/// Votes held by the second party before any modeled region is counted.
pub const DEFAULT_REP_BASELINE: usize = 122;

/// Mass lost to truncation above which a warning is logged.
const TRUNCATION_WARN_THRESHOLD: f64 = 1e-6;

/// Knobs of the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSettings {
    /// Number of equal strata of the shock interval.
    pub num_strata: usize,
    /// Length of each PMF (vote totals `0..outcome_space`).
    pub outcome_space: usize,
    /// Starting vote total of the first party.
    pub dem_baseline: usize,
    /// Starting vote total of the second party.
    pub rep_baseline: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            num_strata: DEFAULT_NUM_STRATA,
            outcome_space: DEFAULT_OUTCOME_SPACE,
            dem_baseline: DEFAULT_DEM_BASELINE,
            rep_baseline: DEFAULT_REP_BASELINE,
        }
    }
}

/// Vote-total distributions of both parties from one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyPmfs {
    /// First party: collects a region's weight when the region is lost.
    pub dem: OutcomePmf,
    /// Second party: collects a region's weight when the region is won.
    pub rep: OutcomePmf,
}

/// Computes both parties' PMFs with default baselines and outcome space.
///
/// # Examples
/// ```
/// use needle_forecast::aggregate::compute_pmfs;
/// use needle_forecast::random::create_rng;
/// use needle_forecast::region::Region;
///
/// let regions = vec![Region::new("PA", 19, 0.0, 0.5).unwrap()];
/// let mut rng = create_rng(42);
/// let pmfs = compute_pmfs(&regions, 256, &mut rng);
/// assert_eq!(pmfs.dem.len(), 538);
/// assert!((pmfs.dem.total_mass() - 1.0).abs() < 1e-9);
/// ```
pub fn compute_pmfs<R: Rng + ?Sized>(regions: &[Region], num_strata: usize, rng: &mut R) -> PartyPmfs {
    let settings = AggregationSettings {
        num_strata,
        ..AggregationSettings::default()
    };
    compute_pmfs_with(regions, &settings, rng)
}

/// Computes both parties' PMFs under explicit settings.
///
/// A baseline outside the outcome space yields an all-zero PMF for that
/// party; `num_strata == 0` yields all-zero PMFs for both.
pub fn compute_pmfs_with<R: Rng + ?Sized>(
    regions: &[Region],
    settings: &AggregationSettings,
    rng: &mut R,
) -> PartyPmfs {
    let len = settings.outcome_space;
    let mut dem = OutcomePmf::zeros(len);
    let mut rep = OutcomePmf::zeros(len);

    if settings.num_strata == 0 {
        return PartyPmfs { dem, rep };
    }

    let dem_start = OutcomePmf::point(len, settings.dem_baseline).unwrap_or_else(|| OutcomePmf::zeros(len));
    let rep_start = OutcomePmf::point(len, settings.rep_baseline).unwrap_or_else(|| OutcomePmf::zeros(len));

    // (p, correlation, weight) per region, in caller order.
    let params: Vec<(f64, f64, usize)> = regions
        .iter()
        .map(|r| (r.win_probability(), r.correlation(), r.weight() as usize))
        .collect();

    for stratum in 0..settings.num_strata {
        let mut stratum_dem = dem_start.clone();
        let mut stratum_rep = rep_start.clone();

        for &(p, correlation, weight) in &params {
            let shock = stratified_draw(stratum, settings.num_strata, rng);
            let state_prob = conditional_win_probability(shock, p, correlation, Leg::Aggregation);

            stratum_dem = stratum_dem.convolve_binary(state_prob, 1.0 - state_prob, weight);
            stratum_rep = stratum_rep.convolve_binary(1.0 - state_prob, state_prob, weight);
        }

        dem.accumulate(&stratum_dem);
        rep.accumulate(&stratum_rep);
    }

    let strata = settings.num_strata as f64;
    dem.scale_down(strata);
    rep.scale_down(strata);

    let dem_mass = dem.total_mass();
    let rep_mass = rep.total_mass();
    debug!(
        regions = regions.len(),
        num_strata = settings.num_strata,
        dem_mass,
        rep_mass,
        "aggregated outcome distributions"
    );
    let start_mass = dem_start.total_mass().min(rep_start.total_mass());
    if start_mass - dem_mass.min(rep_mass) > TRUNCATION_WARN_THRESHOLD {
        warn!(
            dem_mass,
            rep_mass,
            outcome_space = len,
            "vote totals exceed the outcome space; truncated mass is not renormalized"
        );
    }

    PartyPmfs { dem, rep }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn region(id: &str, weight: u32, angle: f64, correlation: f64) -> Region {
        Region::new(id, weight, angle, correlation).unwrap()
    }

    #[test]
    fn test_single_region_mass_and_mean() {
        let regions = vec![region("A", 5, 0.0, 0.5)];
        let mut rng = create_rng(42);
        let pmfs = compute_pmfs(&regions, DEFAULT_NUM_STRATA, &mut rng);

        assert!((pmfs.dem.total_mass() - 1.0).abs() < 1e-3);
        assert!((pmfs.rep.total_mass() - 1.0).abs() < 1e-3);
        // Only two totals are reachable per party.
        assert!((pmfs.dem.get(191) + pmfs.dem.get(196) - 1.0).abs() < 1e-9);
        assert!((pmfs.rep.get(122) + pmfs.rep.get(127) - 1.0).abs() < 1e-9);
        assert!((pmfs.dem.mean() - 193.5).abs() < 0.05, "dem mean {}", pmfs.dem.mean());
    }

    #[test]
    fn test_no_regions_is_baseline_point_mass() {
        let mut rng = create_rng(1);
        let pmfs = compute_pmfs(&[], 16, &mut rng);
        assert_eq!(pmfs.dem.get(DEFAULT_DEM_BASELINE), 1.0);
        assert_eq!(pmfs.rep.get(DEFAULT_REP_BASELINE), 1.0);
        assert_eq!(pmfs.dem.total_mass(), 1.0);
    }

    #[test]
    fn test_independent_regions_are_binomial() {
        let regions = vec![region("A", 10, 0.0, 0.0), region("B", 20, 0.0, 0.0)];
        let mut rng = create_rng(7);
        let pmfs = compute_pmfs(&regions, 32, &mut rng);
        for total in [191, 201, 211, 221] {
            assert!((pmfs.dem.get(total) - 0.25).abs() < 1e-12, "dem[{total}]");
        }
    }

    #[test]
    fn test_full_correlation_moves_regions_together() {
        let regions = vec![region("A", 10, 0.0, 1.0), region("B", 20, 0.0, 1.0)];
        let mut rng = create_rng(11);
        let pmfs = compute_pmfs(&regions, DEFAULT_NUM_STRATA, &mut rng);
        // Split outcomes only happen in the stratum straddling the step.
        let split = pmfs.dem.get(201) + pmfs.dem.get(211);
        assert!(split <= 1.0 / DEFAULT_NUM_STRATA as f64 + 1e-12, "split mass {split}");
        assert!((pmfs.dem.get(191) - 0.5).abs() < 2e-3);
        assert!((pmfs.dem.get(221) - 0.5).abs() < 2e-3);
    }

    #[test]
    fn test_party_pmfs_mirror_each_other() {
        let regions = vec![
            region("A", 13, -54.0, 0.5),
            region("B", 19, 0.0, 0.3),
            region("C", 40, 54.0, 0.8),
        ];
        let mut rng = create_rng(3);
        let pmfs = compute_pmfs(&regions, 128, &mut rng);
        // dem + rep always equals baselines plus all weights.
        let total = DEFAULT_DEM_BASELINE + DEFAULT_REP_BASELINE + 13 + 19 + 40;
        for k in DEFAULT_DEM_BASELINE..=DEFAULT_DEM_BASELINE + 72 {
            assert!((pmfs.dem.get(k) - pmfs.rep.get(total - k)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_seed_reproducibility() {
        let regions = vec![region("A", 6, 12.0, 0.4), region("B", 11, -20.0, 0.6)];
        let a = compute_pmfs(&regions, 64, &mut create_rng(99));
        let b = compute_pmfs(&regions, 64, &mut create_rng(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_truncation_drops_mass() {
        let settings = AggregationSettings {
            num_strata: 8,
            outcome_space: 200,
            ..AggregationSettings::default()
        };
        let regions = vec![region("A", 50, 0.0, 0.0)];
        let mut rng = create_rng(5);
        let pmfs = compute_pmfs_with(&regions, &settings, &mut rng);
        // 191 + 50 is past the end, so the losing branch is dropped.
        assert!((pmfs.dem.total_mass() - 0.5).abs() < 1e-12);
        assert!((pmfs.rep.total_mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_strata_and_bad_baseline() {
        let regions = vec![region("A", 5, 0.0, 0.5)];
        let mut rng = create_rng(5);
        let pmfs = compute_pmfs(&regions, 0, &mut rng);
        assert_eq!(pmfs.dem.total_mass(), 0.0);

        let settings = AggregationSettings {
            num_strata: 4,
            dem_baseline: 600,
            ..AggregationSettings::default()
        };
        let pmfs = compute_pmfs_with(&regions, &settings, &mut rng);
        assert_eq!(pmfs.dem.total_mass(), 0.0);
        assert!((pmfs.rep.total_mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_region_order_does_not_change_shape() {
        let a = region("A", 7, 30.0, 0.2);
        let b = region("B", 9, -10.0, 0.2);
        let forward = compute_pmfs(&[a.clone(), b.clone()], DEFAULT_NUM_STRATA, &mut create_rng(8));
        let backward = compute_pmfs(&[b, a], DEFAULT_NUM_STRATA, &mut create_rng(8));
        for k in 0..DEFAULT_OUTCOME_SPACE {
            assert!((forward.dem.get(k) - backward.dem.get(k)).abs() < 0.02, "dem[{k}]");
        }
    }
}
