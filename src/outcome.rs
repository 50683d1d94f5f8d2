//! Probability mass functions over vote totals.
//!
//! An [`OutcomePmf`] is a fixed-length array indexed by total vote count.
//! The aggregation truncates mass that would land past the last index and
//! never renormalizes, so the total can fall short of 1; consumers read
//! that shortfall through [`OutcomePmf::total_mass`].
//!
//! # Algorithms
//!
//! - **Sums**: Neumaier compensated summation, so the reported mass and
//!   threshold probabilities do not drift with the outcome-space size.

use serde::Serialize;

/// Default outcome-space size: vote totals 0..=537.
pub const DEFAULT_OUTCOME_SPACE: usize = 538;

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *Zeitschrift für Angewandte
/// Mathematik und Mechanik* 54(1), pp. 39–51.
///
/// # Examples
/// ```
/// use needle_forecast::outcome::compensated_sum;
/// let v = [1e16, 1.0, -1e16];
/// assert_eq!(compensated_sum(v.iter().copied()), 1.0);
/// ```
pub fn compensated_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for x in values {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Probability of each possible vote total for one party.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutcomePmf {
    mass: Vec<f64>,
}

impl OutcomePmf {
    /// All-zero PMF over `len` outcomes.
    pub fn zeros(len: usize) -> Self {
        Self { mass: vec![0.0; len] }
    }

    /// Point mass at `total`.
    ///
    /// Returns `None` if `total` is outside `0..len`.
    pub fn point(len: usize, total: usize) -> Option<Self> {
        if total >= len {
            return None;
        }
        let mut pmf = Self::zeros(len);
        pmf.mass[total] = 1.0;
        Some(pmf)
    }

    /// Wraps raw masses without checking them.
    pub fn from_vec(mass: Vec<f64>) -> Self {
        Self { mass }
    }

    pub fn len(&self) -> usize {
        self.mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.mass
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.mass
    }

    /// Mass at vote total `total`, zero outside the outcome space.
    pub fn get(&self, total: usize) -> f64 {
        self.mass.get(total).copied().unwrap_or(0.0)
    }

    /// Sum of all entries.
    pub fn total_mass(&self) -> f64 {
        compensated_sum(self.mass.iter().copied())
    }

    /// `P(total ≥ threshold)`.
    ///
    /// # Examples
    /// ```
    /// use needle_forecast::outcome::OutcomePmf;
    /// let pmf = OutcomePmf::from_vec(vec![0.1, 0.2, 0.3, 0.4]);
    /// assert!((pmf.probability_at_least(2) - 0.7).abs() < 1e-12);
    /// assert_eq!(pmf.probability_at_least(10), 0.0);
    /// ```
    pub fn probability_at_least(&self, threshold: usize) -> f64 {
        match self.mass.get(threshold..) {
            Some(tail) => compensated_sum(tail.iter().copied()),
            None => 0.0,
        }
    }

    /// Running sum `P(total ≤ k)` for every `k`.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut acc = 0.0;
        self.mass
            .iter()
            .map(|&m| {
                acc += m;
                acc
            })
            .collect()
    }

    /// Expected vote total, `Σ k · P(k)`.
    ///
    /// Uses the retained mass as-is; truncated mass contributes nothing.
    pub fn mean(&self) -> f64 {
        compensated_sum(self.mass.iter().enumerate().map(|(k, &m)| k as f64 * m))
    }

    /// Smallest `k` with `P(total ≤ k) ≥ q`.
    ///
    /// Returns `None` if `q` is outside `[0, 1]` or the retained mass never
    /// reaches `q`.
    pub fn quantile(&self, q: f64) -> Option<usize> {
        if !(0.0..=1.0).contains(&q) {
            return None;
        }
        self.cumulative().iter().position(|&c| c >= q)
    }

    /// Adds `other` entry-wise. Lengths must match.
    pub(crate) fn accumulate(&mut self, other: &OutcomePmf) {
        debug_assert_eq!(self.len(), other.len());
        for (acc, &m) in self.mass.iter_mut().zip(&other.mass) {
            *acc += m;
        }
    }

    /// Divides every entry by `divisor`.
    pub(crate) fn scale_down(&mut self, divisor: f64) {
        for m in &mut self.mass {
            *m /= divisor;
        }
    }

    /// Splits every non-zero mass at `t` into a `stay` share at `t` and an
    /// `advance` share at `t + shift`, dropping whatever lands past the last
    /// index.
    pub(crate) fn convolve_binary(&self, stay: f64, advance: f64, shift: usize) -> OutcomePmf {
        let len = self.len();
        let mut next = vec![0.0; len];
        for (t, &m) in self.mass.iter().enumerate() {
            if m > 0.0 {
                next[t] += m * stay;
                if t + shift < len {
                    next[t + shift] += m * advance;
                }
            }
        }
        OutcomePmf { mass: next }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn convolution_conserves_mass_without_truncation(
            start in 0_usize..20,
            shift in 1_usize..20,
            keep in 0.0_f64..=1.0,
        ) {
            let pmf = OutcomePmf::point(64, start).unwrap();
            let next = pmf.convolve_binary(keep, 1.0 - keep, shift);
            prop_assert!((next.total_mass() - 1.0).abs() < 1e-12);
        }

        #[test]
        fn tail_probability_is_monotonic(
            masses in proptest::collection::vec(0.0_f64..1.0, 1..50),
            t1 in 0_usize..60,
            t2 in 0_usize..60,
        ) {
            let pmf = OutcomePmf::from_vec(masses);
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            prop_assert!(pmf.probability_at_least(lo) + 1e-12 >= pmf.probability_at_least(hi));
        }
    }
}
