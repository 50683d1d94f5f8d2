//! Correlated-outcome model.
//!
//! Every region is tied to a shared shock `s ∈ [0, 1]`. Given the region's
//! marginal probability `p` and correlation `ρ`, the conditional win
//! probability is a Beta CDF in the shock with concentration
//! `n = ρ / (1 − ρ)`:
//!
//! | ρ | conditional probability |
//! |---|---|
//! | 0 | `p`, shock ignored |
//! | (0, 1) | Beta CDF, non-decreasing in `s` |
//! | 1 | step: `0` for `s < 1 − p`, else `1` |
//!
//! # Legs
//!
//! The two consumers parameterize the Beta differently and are kept apart
//! on purpose:
//!
//! - [`Leg::Aggregation`]: `α = n·p`, `β = n·(1−p)`, result `1 − I_{1−s}(α, β)`.
//! - [`Leg::Scenario`]: `α = n·(1−p)`, `β = n·p`, result `I_s(α, β)`.

use crate::special::regularized_incomplete_beta;

/// Which parameterization of the model a caller evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Used by the PMF aggregation: win-or-not per stratum draw.
    Aggregation,
    /// Used by the scenario evaluator: conditional CDF at a fixed shock.
    Scenario,
}

/// Beta shape parameters derived from `(p, ρ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParameters {
    pub alpha: f64,
    pub beta: f64,
}

impl ShapeParameters {
    /// `α = n·p`, `β = n·(1−p)`.
    pub fn for_aggregation(p: f64, correlation: f64) -> Self {
        let n = concentration(correlation);
        Self {
            alpha: n * p,
            beta: n * (1.0 - p),
        }
    }

    /// `α = n·(1−p)`, `β = n·p`.
    pub fn for_scenario(p: f64, correlation: f64) -> Self {
        let n = concentration(correlation);
        Self {
            alpha: n * (1.0 - p),
            beta: n * p,
        }
    }

    /// Shapes for the given leg.
    pub fn for_leg(leg: Leg, p: f64, correlation: f64) -> Self {
        match leg {
            Leg::Aggregation => Self::for_aggregation(p, correlation),
            Leg::Scenario => Self::for_scenario(p, correlation),
        }
    }
}

/// Concentration `n = ρ / (1 − ρ)`; zero for `ρ = 0`, infinite for `ρ = 1`.
///
/// # Examples
/// ```
/// use needle_forecast::correlation::concentration;
/// assert_eq!(concentration(0.0), 0.0);
/// assert!((concentration(0.5) - 1.0).abs() < 1e-15);
/// assert!((concentration(0.75) - 3.0).abs() < 1e-12);
/// ```
#[inline]
pub fn concentration(correlation: f64) -> f64 {
    correlation / (1.0 - correlation)
}

/// Conditional win probability of a region given the shared shock.
///
/// `shock`, `p` and `correlation` are expected in [0, 1]; nothing is
/// validated here.
///
/// # Examples
/// ```
/// use needle_forecast::correlation::{conditional_win_probability, Leg};
/// // Independent region: the shock is irrelevant.
/// assert_eq!(conditional_win_probability(0.9, 0.3, 0.0, Leg::Scenario), 0.3);
/// // Perfectly correlated: a step at 1 − p.
/// assert_eq!(conditional_win_probability(0.2, 0.7, 1.0, Leg::Aggregation), 0.0);
/// assert_eq!(conditional_win_probability(0.5, 0.7, 1.0, Leg::Aggregation), 1.0);
/// ```
pub fn conditional_win_probability(shock: f64, p: f64, correlation: f64, leg: Leg) -> f64 {
    if correlation == 0.0 {
        return p;
    }
    if correlation == 1.0 {
        return if shock < 1.0 - p { 0.0 } else { 1.0 };
    }

    let shapes = ShapeParameters::for_leg(leg, p, correlation);
    match leg {
        Leg::Aggregation => 1.0 - regularized_incomplete_beta(1.0 - shock, shapes.alpha, shapes.beta),
        Leg::Scenario => regularized_incomplete_beta(shock, shapes.alpha, shapes.beta),
    }
}
