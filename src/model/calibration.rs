//! Heston calibration to an ATM implied-volatility term structure.
//!
//! The model ATM variance at maturity `T` is the expected average variance
//! over `[0, T]`. The calibrator minimises
//! `Σ (model_variance(T_i) - market_vol_i²)²` over `{v0, kappa, theta}`,
//! with `rho` and `xi` held fixed. ATM data carries no information about
//! either of them.
//!
//! The search runs in log-space, so every candidate has strictly positive
//! `v0`, `kappa` and `theta`. With a single market point `kappa` is not
//! identifiable and is held at the initial guess.

use super::heston::{expected_average_variance, validate_rho, validate_xi, HestonParameters, ParameterError};
use super::optimizer::{nelder_mead, Bounds, NelderMeadOptions, Termination};
use crate::core::volatility::MarketVolPoint;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LOG_VARIANCE_BOUNDS: (f64, f64) = (-18.420680743952367, 1.6094379124341003); // [1e-8, 5]
const LOG_KAPPA_BOUNDS: (f64, f64) = (-9.210340371976182, 3.912023005428146); // [1e-4, 50]

/// Optimizer non-convergence or unusable market data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("at least one market vol point is required, got {supplied}")]
    InsufficientData { supplied: usize },
    #[error("invalid market vol point (maturity {maturity}, vol {vol})")]
    InvalidMarketPoint { maturity: f64, vol: f64 },
    #[error("invalid fixed or initial parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
    #[error("optimizer did not converge within {iterations} iterations (objective {objective:e})")]
    NotConverged { iterations: usize, objective: f64 },
    #[error("calibration objective became non-finite")]
    NonFiniteObjective,
}

/// Starting point for `{v0, kappa, theta}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub v0: f64,
    pub kappa: f64,
    pub theta: f64,
}

impl Default for InitialGuess {
    fn default() -> Self {
        Self {
            v0: 0.04,
            kappa: 2.0,
            theta: 0.04,
        }
    }
}

/// Outcome of a successful calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub parameters: HestonParameters,
    /// Sum of squared variance errors at the optimum.
    pub objective: f64,
    pub iterations: usize,
    /// True when only one market point was supplied and kappa was held at
    /// the initial guess.
    pub kappa_fixed: bool,
}

impl Calibration {
    /// Largest absolute gap between model and market ATM variance.
    pub fn max_variance_error(&self, market: &[MarketVolPoint]) -> f64 {
        market
            .iter()
            .map(|p| (self.parameters.atm_variance(p.maturity) - p.variance()).abs())
            .fold(0.0, f64::max)
    }
}

/// Fits `{v0, kappa, theta}` to ATM implied vols for fixed `rho` and `xi`.
///
/// # Examples
///
/// ```
/// use fx_hedge_engine::model::calibration::HestonCalibrator;
/// use fx_hedge_engine::core::volatility::MarketVolPoint;
///
/// let market = [MarketVolPoint::new(1.0, 0.06), MarketVolPoint::new(5.0, 0.07)];
/// let calibration = HestonCalibrator::new(-0.7, 0.3).calibrate(&market).unwrap();
///
/// assert!(calibration.max_variance_error(&market) < 1e-8);
/// assert!(calibration.parameters.v0 > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HestonCalibrator {
    rho: f64,
    xi: f64,
    initial_guess: InitialGuess,
    options: NelderMeadOptions,
}

impl HestonCalibrator {
    pub fn new(rho: f64, xi: f64) -> Self {
        Self {
            rho,
            xi,
            initial_guess: InitialGuess::default(),
            options: NelderMeadOptions::default(),
        }
    }

    pub fn with_initial_guess(mut self, guess: InitialGuess) -> Self {
        self.initial_guess = guess;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }

    pub fn calibrate(&self, market: &[MarketVolPoint]) -> Result<Calibration, CalibrationError> {
        if market.is_empty() {
            return Err(CalibrationError::InsufficientData { supplied: 0 });
        }
        for p in market {
            if p.validate().is_err() {
                return Err(CalibrationError::InvalidMarketPoint {
                    maturity: p.maturity,
                    vol: p.atm_vol,
                });
            }
        }
        validate_rho(self.rho)?;
        validate_xi(self.xi)?;
        let guess = self.initial_guess;
        HestonParameters::new(guess.v0, guess.kappa, guess.theta, self.xi, self.rho).validate()?;

        let kappa_fixed = market.len() == 1;
        let targets: Vec<(f64, f64)> = market.iter().map(|p| (p.maturity, p.variance())).collect();
        let objective = |v0: f64, kappa: f64, theta: f64| -> f64 {
            targets
                .iter()
                .map(|&(t, var)| {
                    let r = expected_average_variance(v0, kappa, theta, t) - var;
                    r * r
                })
                .sum()
        };

        let (v_lo, v_hi) = LOG_VARIANCE_BOUNDS;
        let (k_lo, k_hi) = LOG_KAPPA_BOUNDS;
        let outcome = if kappa_fixed {
            // x = [ln v0, ln theta]
            let bounds = Bounds {
                lower: vec![v_lo, v_lo],
                upper: vec![v_hi, v_hi],
            };
            let start = [guess.v0.ln(), guess.theta.ln()];
            nelder_mead(&start, &bounds, self.options, |x| {
                objective(x[0].exp(), guess.kappa, x[1].exp())
            })
        } else {
            // x = [ln v0, ln kappa, ln theta]
            let bounds = Bounds {
                lower: vec![v_lo, k_lo, v_lo],
                upper: vec![v_hi, k_hi, v_hi],
            };
            let start = [guess.v0.ln(), guess.kappa.ln(), guess.theta.ln()];
            nelder_mead(&start, &bounds, self.options, |x| {
                objective(x[0].exp(), x[1].exp(), x[2].exp())
            })
        };

        debug!(
            "calibration stopped after {} iterations ({} evaluations): {:?}, objective {:e}",
            outcome.iterations, outcome.evaluations, outcome.termination, outcome.objective
        );

        match outcome.termination {
            Termination::NonFiniteObjective => return Err(CalibrationError::NonFiniteObjective),
            Termination::MaxIterations => {
                return Err(CalibrationError::NotConverged {
                    iterations: outcome.iterations,
                    objective: outcome.objective,
                })
            }
            Termination::ObjectiveFloor | Termination::SimplexCollapsed => {}
        }

        let (v0, kappa, theta) = if kappa_fixed {
            (outcome.x[0].exp(), guess.kappa, outcome.x[1].exp())
        } else {
            (outcome.x[0].exp(), outcome.x[1].exp(), outcome.x[2].exp())
        };
        let parameters = HestonParameters::new(v0, kappa, theta, self.xi, self.rho);
        parameters.validate()?;

        if !parameters.feller_satisfied() {
            warn!(
                "calibrated parameters violate the Feller condition (2·kappa·theta = {:.6} < xi² = {:.6}); \
                 simulated variance will touch zero",
                2.0 * kappa * theta,
                self.xi * self.xi
            );
        }

        Ok(Calibration {
            parameters,
            objective: outcome.objective,
            iterations: outcome.iterations,
            kappa_fixed,
        })
    }
}
