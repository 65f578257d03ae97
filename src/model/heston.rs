//! Heston stochastic-volatility parameters.
//!
//! The FX spot `S` (domestic per foreign) and its instantaneous variance `v`
//! follow
//!
//! ```text
//! dS/S = (r_d - r_f) dt + sqrt(v) dW_s
//! dv   = kappa (theta - v) dt + xi sqrt(v) dW_v,    d<W_s, W_v> = rho dt
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parameter outside its admissible range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Heston parameter {name} = {value} is invalid: {requirement}")]
pub struct ParameterError {
    pub name: &'static str,
    pub value: f64,
    pub requirement: &'static str,
}

/// Calibrated Heston parameters. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParameters {
    /// Initial variance.
    pub v0: f64,
    /// Mean-reversion speed.
    pub kappa: f64,
    /// Long-run variance.
    pub theta: f64,
    /// Volatility of variance.
    pub xi: f64,
    /// Spot/variance correlation.
    pub rho: f64,
}

impl HestonParameters {
    pub fn new(v0: f64, kappa: f64, theta: f64, xi: f64, rho: f64) -> Self {
        Self {
            v0,
            kappa,
            theta,
            xi,
            rho,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("v0", self.v0)?;
        positive("kappa", self.kappa)?;
        positive("theta", self.theta)?;
        validate_xi(self.xi)?;
        validate_rho(self.rho)
    }

    /// `2·kappa·theta ≥ xi²`: the continuous process never touches zero.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.xi * self.xi
    }

    /// Expected average variance over `[0, t]`:
    /// `E[∫₀ᵗ v_s ds] / t = theta + (v0 - theta)(1 - e^{-kappa t}) / (kappa t)`.
    ///
    /// Returns `v0` as `t → 0`.
    pub fn atm_variance(&self, t: f64) -> f64 {
        expected_average_variance(self.v0, self.kappa, self.theta, t)
    }

    /// Model ATM-equivalent volatility, `sqrt(atm_variance(t))`.
    pub fn atm_vol(&self, t: f64) -> f64 {
        self.atm_variance(t).max(0.0).sqrt()
    }
}

/// Closed-form expected average variance; shared with the calibrator so
/// the objective and the reported term structure never drift apart.
pub(crate) fn expected_average_variance(v0: f64, kappa: f64, theta: f64, t: f64) -> f64 {
    let x = kappa * t;
    let weight = if x.abs() < 1e-12 {
        1.0 - 0.5 * x
    } else {
        -(-x).exp_m1() / x
    };
    theta + (v0 - theta) * weight
}

fn positive(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError {
            name,
            value,
            requirement: "must be positive and finite",
        })
    }
}

pub(crate) fn validate_xi(xi: f64) -> Result<(), ParameterError> {
    if xi.is_finite() && xi >= 0.0 {
        Ok(())
    } else {
        Err(ParameterError {
            name: "xi",
            value: xi,
            requirement: "must be non-negative and finite",
        })
    }
}

pub(crate) fn validate_rho(rho: f64) -> Result<(), ParameterError> {
    if (-1.0..=1.0).contains(&rho) {
        Ok(())
    } else {
        Err(ParameterError {
            name: "rho",
            value: rho,
            requirement: "must lie in [-1, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atm_variance_limits() {
        let p = HestonParameters::new(0.01, 1.5, 0.04, 0.3, -0.5);
        assert_relative_eq!(p.atm_variance(0.0), 0.01, epsilon = 1e-12);
        // Long maturities converge to theta.
        assert_relative_eq!(p.atm_variance(1_000.0), 0.04, epsilon = 1e-4);
    }

    #[test]
    fn test_atm_variance_closed_form() {
        let p = HestonParameters::new(0.0036, 2.0, 0.0049, 0.3, -0.7);
        let t: f64 = 3.0;
        let expected = 0.0049 + (0.0036 - 0.0049) * (1.0 - (-6.0f64).exp()) / 6.0;
        assert_relative_eq!(p.atm_variance(t), expected, epsilon = 1e-15);
        assert_relative_eq!(p.atm_vol(t), expected.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_flat_term_structure_when_v0_equals_theta() {
        let p = HestonParameters::new(0.02, 3.0, 0.02, 0.5, 0.0);
        for t in [0.1, 1.0, 5.0, 30.0] {
            assert_relative_eq!(p.atm_variance(t), 0.02, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_validation() {
        assert!(HestonParameters::new(0.04, 2.0, 0.04, 0.3, -0.7).validate().is_ok());
        assert!(HestonParameters::new(0.04, 2.0, 0.04, 0.0, 1.0).validate().is_ok());

        let err = HestonParameters::new(0.0, 2.0, 0.04, 0.3, -0.7)
            .validate()
            .unwrap_err();
        assert_eq!(err.name, "v0");

        let err = HestonParameters::new(0.04, 2.0, 0.04, 0.3, -1.2)
            .validate()
            .unwrap_err();
        assert_eq!(err.name, "rho");

        let err = HestonParameters::new(0.04, 2.0, 0.04, -0.1, 0.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.name, "xi");
    }

    #[test]
    fn test_feller() {
        assert!(HestonParameters::new(0.04, 2.0, 0.04, 0.3, 0.0).feller_satisfied());
        assert!(!HestonParameters::new(0.004, 2.0, 0.004, 0.3, 0.0).feller_satisfied());
    }
}
