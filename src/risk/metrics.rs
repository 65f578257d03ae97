//! Summary statistics of an NPV distribution.
//!
//! VaR is reported as a level of the NPV distribution, not as a loss:
//! `VaR(c)` is the `(1 - c)` quantile, so a 95% VaR is the 5th percentile.
//! Quantiles interpolate linearly between order statistics at rank
//! `h = (n - 1)·p` (Hyndman–Fan type 7, the NumPy default). CVaR is the
//! mean of every observation at or below the VaR level, so
//! `CVaR(c) ≤ VaR(c)` always holds.

use super::MetricsError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn validate_sample(values: &[f64]) -> Result<(), MetricsError> {
    if values.len() < 2 {
        return Err(MetricsError::TooFewObservations(values.len()));
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(MetricsError::NonFiniteObservation { index });
    }
    Ok(())
}

fn validate_confidence(confidence: f64) -> Result<(), MetricsError> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(MetricsError::InvalidConfidence(confidence))
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Type-7 quantile of an already sorted, non-empty sample.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Mean of everything at or below the `(1 - confidence)` quantile.
fn tail_mean_sorted(sorted: &[f64], var: f64) -> f64 {
    // The minimum is always <= var, so the tail is never empty.
    let tail = sorted.partition_point(|&v| v <= var).max(1);
    // Summing a tied tail can round a few ulps above its common value.
    (sorted[..tail].iter().sum::<f64>() / tail as f64).min(var)
}

pub fn mean(values: &[f64]) -> Result<f64, MetricsError> {
    validate_sample(values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divisor `n - 1`).
pub fn std_dev(values: &[f64]) -> Result<f64, MetricsError> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / (values.len() - 1) as f64).sqrt())
}

/// Linearly interpolated `p`-quantile, `p ∈ [0, 1]`.
pub fn quantile(values: &[f64], p: f64) -> Result<f64, MetricsError> {
    validate_sample(values)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(MetricsError::InvalidProbability(p));
    }
    Ok(quantile_sorted(&sorted(values), p))
}

/// Value at Risk as a level: the `(1 - confidence)` quantile.
///
/// ```
/// use fx_hedge_engine::risk::metrics::value_at_risk;
///
/// let npvs: Vec<f64> = (1..=101).map(f64::from).collect();
/// assert_eq!(value_at_risk(&npvs, 0.95).unwrap(), 6.0);
/// ```
pub fn value_at_risk(values: &[f64], confidence: f64) -> Result<f64, MetricsError> {
    validate_sample(values)?;
    validate_confidence(confidence)?;
    Ok(quantile_sorted(&sorted(values), 1.0 - confidence))
}

/// Conditional VaR: mean of all values at or below [`value_at_risk`].
pub fn conditional_value_at_risk(values: &[f64], confidence: f64) -> Result<f64, MetricsError> {
    validate_sample(values)?;
    validate_confidence(confidence)?;
    let s = sorted(values);
    let var = quantile_sorted(&s, 1.0 - confidence);
    Ok(tail_mean_sorted(&s, var))
}

/// Distribution summary for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub trials: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub var_95: f64,
    pub var_99: f64,
    pub cvar_95: f64,
    pub cvar_99: f64,
}

impl RiskReport {
    /// Compute every statistic from one sort of the sample.
    pub fn from_npvs(npvs: &[f64]) -> Result<Self, MetricsError> {
        let mean = mean(npvs)?;
        let std_dev = std_dev(npvs)?;
        let s = sorted(npvs);
        let var_95 = quantile_sorted(&s, 0.05);
        let var_99 = quantile_sorted(&s, 0.01);

        Ok(Self {
            trials: npvs.len(),
            mean,
            median: quantile_sorted(&s, 0.5),
            std_dev,
            var_95,
            var_99,
            cvar_95: tail_mean_sorted(&s, var_95),
            cvar_99: tail_mean_sorted(&s, var_99),
        })
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Mean:      {:>16.0}", self.mean)?;
        writeln!(f, "  Median:    {:>16.0}", self.median)?;
        writeln!(f, "  Std Dev:   {:>16.0}", self.std_dev)?;
        writeln!(f, "  VaR 95%:   {:>16.0}", self.var_95)?;
        writeln!(f, "  VaR 99%:   {:>16.0}", self.var_99)?;
        writeln!(f, "  CVaR 95%:  {:>16.0}", self.cvar_95)?;
        writeln!(f, "  CVaR 99%:  {:>16.0}", self.cvar_99)
    }
}
