//! Stochastic-volatility model and its calibration.

pub mod calibration;
pub mod heston;
pub mod optimizer;

pub use crate::core::volatility::MarketVolPoint;
pub use calibration::{Calibration, CalibrationError, HestonCalibrator, InitialGuess};
pub use heston::{HestonParameters, ParameterError};
