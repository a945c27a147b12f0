//! Summary statistics over small in-memory series
//!
//! Preconditions: n >= 1 for `sum` / `mean`, n >= 2 for `deviation`,
//! `pearson_correlation` and `linear_regression`.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("series is empty")]
    Empty,

    #[error("need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("x values have zero variance")]
    ZeroVariance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn sum(xs: &[f64]) -> Result<f64, StatsError> {
    if xs.is_empty() {
        return Err(StatsError::Empty);
    }
    Ok(xs.iter().sum())
}

pub fn mean(xs: &[f64]) -> Result<f64, StatsError> {
    Ok(sum(xs)? / xs.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn deviation(xs: &[f64]) -> Result<f64, StatsError> {
    require(xs.len(), 2)?;
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Ok((ss / (xs.len() - 1) as f64).sqrt())
}

/// Pearson correlation coefficient. NaN when either series is constant.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Result<f64, StatsError> {
    let (sxy, sxx, syy) = co_moments(xs, ys)?;
    Ok(sxy / (sxx * syy).sqrt())
}

/// Ordinary least squares fit of `y = slope * x + intercept`.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<Regression, StatsError> {
    let (sxy, sxx, _) = co_moments(xs, ys)?;
    if sxx == 0.0 {
        return Err(StatsError::ZeroVariance);
    }
    let slope = sxy / sxx;
    let intercept = mean(ys)? - slope * mean(xs)?;
    Ok(Regression { slope, intercept })
}

/// Group `items` by `key` and average `value` within each group, ordered by key.
pub fn mean_by_key<T, K, FK, FV>(items: &[T], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for item in items {
        let entry = groups.entry(key(item)).or_insert((0.0, 0));
        entry.0 += value(item);
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (total, n))| (k, total / n as f64))
        .collect()
}

fn require(got: usize, needed: usize) -> Result<(), StatsError> {
    if got == 0 {
        Err(StatsError::Empty)
    } else if got < needed {
        Err(StatsError::InsufficientData { needed, got })
    } else {
        Ok(())
    }
}

/// Σ(x-x̄)(y-ȳ), Σ(x-x̄)², Σ(y-ȳ)²
fn co_moments(xs: &[f64], ys: &[f64]) -> Result<(f64, f64, f64), StatsError> {
    if xs.len() != ys.len() {
        return Err(StatsError::LengthMismatch { left: xs.len(), right: ys.len() });
    }
    require(xs.len(), 2)?;

    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Ok((sxy, sxx, syy))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn empty_and_short_series_are_rejected() {
        assert_eq!(sum(&[]), Err(StatsError::Empty));
        assert_eq!(mean(&[]), Err(StatsError::Empty));
        assert_eq!(deviation(&[]), Err(StatsError::Empty));
        assert_eq!(
            deviation(&[3.0]),
            Err(StatsError::InsufficientData { needed: 2, got: 1 })
        );
        assert_eq!(
            pearson_correlation(&[1.0], &[2.0]),
            Err(StatsError::InsufficientData { needed: 2, got: 1 })
        );
        assert_eq!(
            linear_regression(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn mean_sum_and_sample_deviation() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(sum(&xs).unwrap(), 40.0);
        assert_eq!(mean(&xs).unwrap(), 5.0);
        // Sample variance is 32 / 7
        assert!((deviation(&xs).unwrap() - (32.0f64 / 7.0).sqrt()).abs() < EPS);
    }

    #[test]
    fn self_correlation_is_one() {
        let xs = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert!((pearson_correlation(&xs, &xs).unwrap() - 1.0).abs() < EPS);
        let neg: Vec<f64> = xs.iter().map(|x| -x).collect();
        assert!((pearson_correlation(&xs, &neg).unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn constant_series_correlation_is_nan() {
        let r = pearson_correlation(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap();
        assert!(r.is_nan());
        assert_eq!(
            linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::ZeroVariance)
        );
    }

    #[test]
    fn regression_recovers_line() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 3.0).collect();
        let fit = linear_regression(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < EPS);
        assert!((fit.intercept - 3.0).abs() < EPS);
        assert!((fit.predict(10.0) - 23.0).abs() < EPS);
    }

    #[test]
    fn mean_by_workstation() {
        let rows = [(1u8, 4.0), (1, 6.0), (2, 2.0)];
        let means = mean_by_key(&rows, |r| r.0, |r| r.1);
        assert_eq!(means.get(&1), Some(&5.0));
        assert_eq!(means.get(&2), Some(&2.0));
        assert_eq!(means.len(), 2);
    }
}
