use crate::core::ConfigurationError;
use crate::hedging::strategy::{DEFAULT_COLLAR_CALL_LEVEL, DEFAULT_COLLAR_PUT_LEVEL};
use crate::model::InitialGuess;
use crate::simulation::paths::{DEFAULT_SEED, DEFAULT_TIME_STEP, DEFAULT_TRIALS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RHO: f64 = -0.7;
pub const DEFAULT_XI: f64 = 0.3;
pub const DEFAULT_MAX_ITERATIONS: usize = 4_000;

/// Which flat vol the option premiums are priced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionVolSource {
    /// Market ATM vol interpolated at each option's expiry.
    #[default]
    MarketAtm,
    /// `sqrt` of the calibrated model's ATM variance at each expiry.
    HestonEquivalent,
}

/// Maturity at which the constant simulation short rates are read off
/// the domestic and foreign curves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateHorizon {
    /// The year fraction of the last cash flow.
    #[default]
    FinalCashFlow,
    /// A fixed year fraction, e.g. `{"fixed": 5.0}`.
    Fixed(f64),
}

/// Tunables for one hedge analysis run.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of Monte Carlo trials.
    pub trials: usize,
    /// Run seed; each trial derives its own sub-stream from it.
    pub seed: u64,
    /// Simulation step in years.
    pub time_step: f64,
    /// Fixed spot/variance correlation.
    pub rho: f64,
    /// Fixed vol-of-vol.
    pub xi: f64,
    pub initial_guess: InitialGuess,
    /// Optimizer iteration budget for calibration.
    pub max_iterations: usize,
    pub collar_put_level: f64,
    pub collar_call_level: f64,
    pub option_vol: OptionVolSource,
    pub rate_horizon: RateHorizon,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            time_step: DEFAULT_TIME_STEP,
            rho: DEFAULT_RHO,
            xi: DEFAULT_XI,
            initial_guess: InitialGuess::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            collar_put_level: DEFAULT_COLLAR_PUT_LEVEL,
            collar_call_level: DEFAULT_COLLAR_CALL_LEVEL,
            option_vol: OptionVolSource::default(),
            rate_horizon: RateHorizon::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_option_vol(mut self, source: OptionVolSource) -> Self {
        self.option_vol = source;
        self
    }

    pub fn with_rate_horizon(mut self, horizon: RateHorizon) -> Self {
        self.rate_horizon = horizon;
        self
    }

    /// Checks the fields nothing downstream validates on its own.
    ///
    /// Trial count, time step, rho and xi are rejected later by the
    /// simulator and calibrator with their own error kinds.
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if let RateHorizon::Fixed(t) = self.rate_horizon {
            if !t.is_finite() || t < 0.0 {
                return Err(ConfigurationError::InvalidParameter {
                    name: "rate_horizon",
                    value: t,
                });
            }
        }
        if self.max_iterations == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "max_iterations",
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.trials, 10_000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.time_step, 1.0 / 252.0);
        assert_eq!(config.rho, -0.7);
        assert_eq!(config.xi, 0.3);
        assert_eq!(config.max_iterations, 4_000);
        assert_eq!(config.option_vol, OptionVolSource::MarketAtm);
        assert_eq!(config.rate_horizon, RateHorizon::FinalCashFlow);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{ "trials": 500, "option_vol": "heston_equivalent", "rate_horizon": { "fixed": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.trials, 500);
        assert_eq!(config.seed, 42);
        assert_eq!(config.option_vol, OptionVolSource::HestonEquivalent);
        assert_eq!(config.rate_horizon, RateHorizon::Fixed(5.0));
    }

    #[test]
    fn test_invalid_horizon_rejected() {
        let config = AnalysisConfig::default().with_rate_horizon(RateHorizon::Fixed(f64::NAN));
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidParameter { name: "rate_horizon", .. })
        ));
    }
}
