//! Regions: the votable units of a forecast.
//!
//! A region carries a vote weight, a lean angle encoding its marginal
//! win probability, and the correlation coefficient that ties it to the
//! shared shock.
//!
//! # Lean angle
//!
//! The angle is measured in degrees on a half-dial from −90 to +90 and
//! maps to the probability that the region is carried by the second party
//! (the Republican side of the default map):
//!
//! ```text
//! p = sin²((angle + 90) / 2 · π / 180)
//! ```
//!
//! so −90° ↦ 0, 0° ↦ ½ and +90° ↦ 1.

use serde::Serialize;

use crate::error::{ForecastError, Result};

/// Converts a lean angle in degrees to a win probability.
///
/// # Examples
/// ```
/// use needle_forecast::region::lean_to_probability;
/// assert_eq!(lean_to_probability(-90.0), 0.0);
/// assert!((lean_to_probability(0.0) - 0.5).abs() < 1e-12);
/// assert!((lean_to_probability(90.0) - 1.0).abs() < 1e-12);
/// ```
pub fn lean_to_probability(angle: f64) -> f64 {
    ((angle + 90.0) / 2.0).to_radians().sin().powi(2)
}

/// Inverse of [`lean_to_probability`] for `p` in [0, 1].
///
/// # Examples
/// ```
/// use needle_forecast::region::{lean_to_probability, probability_to_lean};
/// let angle = probability_to_lean(0.8);
/// assert!((lean_to_probability(angle) - 0.8).abs() < 1e-12);
/// ```
pub fn probability_to_lean(p: f64) -> f64 {
    2.0 * p.sqrt().asin().to_degrees() - 90.0
}

/// A votable unit with a weight and a correlated win-probability model.
///
/// Construct through [`Region::new`], which enforces the domain
/// constraints. The engine functions assume those constraints hold and do
/// not check them again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    id: String,
    weight: u32,
    lean_angle: f64,
    correlation: f64,
}

impl Region {
    /// Creates a region.
    ///
    /// # Errors
    /// Returns [`ForecastError::InvalidRegion`] if `id` is blank, `weight`
    /// is zero, `lean_angle` is outside [-90, 90] or `correlation` is
    /// outside [0, 1] (non-finite values included).
    ///
    /// # Examples
    /// ```
    /// use needle_forecast::region::Region;
    /// let pa = Region::new("PA", 19, 0.0, 0.5).unwrap();
    /// assert!((pa.win_probability() - 0.5).abs() < 1e-12);
    /// assert!(Region::new("PA", 0, 0.0, 0.5).is_err());
    /// ```
    pub fn new(id: impl Into<String>, weight: u32, lean_angle: f64, correlation: f64) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(invalid(&id, "id must not be blank".to_string()));
        }
        if weight == 0 {
            return Err(invalid(&id, "weight must be positive".to_string()));
        }
        check_lean_angle(&id, lean_angle)?;
        check_correlation(&id, correlation)?;
        Ok(Self {
            id,
            weight,
            lean_angle,
            correlation,
        })
    }

    /// Creates a region from a win probability instead of a lean angle.
    ///
    /// # Errors
    /// As [`Region::new`], plus `probability` outside [0, 1].
    pub fn with_probability(
        id: impl Into<String>,
        weight: u32,
        probability: f64,
        correlation: f64,
    ) -> Result<Self> {
        let id = id.into();
        check_probability(&id, probability)?;
        let lean_angle = probability_to_lean(probability).clamp(-90.0, 90.0);
        Self::new(id, weight, lean_angle, correlation)
    }

    /// Builds a region from values already known to be in domain.
    pub(crate) fn from_trusted(id: &str, weight: u32, lean_angle: f64, correlation: f64) -> Self {
        debug_assert!(Self::new(id, weight, lean_angle, correlation).is_ok());
        Self {
            id: id.to_string(),
            weight,
            lean_angle,
            correlation,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn lean_angle(&self) -> f64 {
        self.lean_angle
    }

    pub fn correlation(&self) -> f64 {
        self.correlation
    }

    /// Marginal probability that the region is carried by the second party.
    pub fn win_probability(&self) -> f64 {
        lean_to_probability(self.lean_angle)
    }

    /// Sets the lean angle.
    ///
    /// # Errors
    /// Rejects angles outside [-90, 90]; the region is left unchanged.
    pub fn set_lean_angle(&mut self, lean_angle: f64) -> Result<()> {
        check_lean_angle(&self.id, lean_angle)?;
        self.lean_angle = lean_angle;
        Ok(())
    }

    /// Sets the lean angle that corresponds to `probability`.
    ///
    /// # Errors
    /// Rejects probabilities outside [0, 1]; the region is left unchanged.
    pub fn set_probability(&mut self, probability: f64) -> Result<()> {
        check_probability(&self.id, probability)?;
        self.lean_angle = probability_to_lean(probability).clamp(-90.0, 90.0);
        Ok(())
    }

    /// Sets the correlation coefficient.
    ///
    /// # Errors
    /// Rejects values outside [0, 1]; the region is left unchanged.
    pub fn set_correlation(&mut self, correlation: f64) -> Result<()> {
        check_correlation(&self.id, correlation)?;
        self.correlation = correlation;
        Ok(())
    }
}

fn invalid(id: &str, reason: String) -> ForecastError {
    ForecastError::InvalidRegion {
        id: id.to_string(),
        reason,
    }
}

fn check_lean_angle(id: &str, lean_angle: f64) -> Result<()> {
    if !lean_angle.is_finite() || !(-90.0..=90.0).contains(&lean_angle) {
        return Err(invalid(
            id,
            format!("lean angle must be in [-90, 90], got {lean_angle}"),
        ));
    }
    Ok(())
}

fn check_correlation(id: &str, correlation: f64) -> Result<()> {
    if !correlation.is_finite() || !(0.0..=1.0).contains(&correlation) {
        return Err(invalid(
            id,
            format!("correlation must be in [0, 1], got {correlation}"),
        ));
    }
    Ok(())
}

fn check_probability(id: &str, probability: f64) -> Result<()> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(invalid(
            id,
            format!("probability must be in [0, 1], got {probability}"),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn probability_in_unit_interval(angle in -90.0_f64..=90.0) {
            let p = lean_to_probability(angle);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn probability_monotonic_in_angle(a1 in -90.0_f64..=90.0, a2 in -90.0_f64..=90.0) {
            let (lo, hi) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
            prop_assert!(lean_to_probability(lo) <= lean_to_probability(hi) + 1e-15);
        }

        #[test]
        fn lean_roundtrip(p in 0.0_f64..=1.0) {
            let back = lean_to_probability(probability_to_lean(p));
            prop_assert!((back - p).abs() < 1e-9, "p = {p}, back = {back}");
        }
    }
}
