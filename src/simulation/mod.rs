//! Monte Carlo simulation of FX spot under Heston dynamics.

pub mod paths;
pub mod rng;

pub use paths::{PathSample, PathSimulator, Recording, SimulatedPath, SimulationConfig};

use crate::model::heston::ParameterError;
use thiserror::Error;

/// Invalid simulation setup or a numerical failure during simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("trial count must be at least 1, got {0}")]
    InvalidTrialCount(usize),
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
    #[error("initial spot must be positive and finite, got {0}")]
    InvalidSpot(f64),
    #[error("{name} rate must be finite, got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("observation time must be non-negative and finite, got {0}")]
    InvalidObservationTime(f64),
    #[error("simulation would need {steps} steps, more than the limit of {max}")]
    TooManySteps { steps: usize, max: usize },
    #[error(transparent)]
    InvalidParameters(#[from] ParameterError),
    #[error("non-finite state in trial {trial} at step {step} (log-spot {log_spot}, variance {variance})")]
    NonFinite {
        trial: usize,
        step: usize,
        log_spot: f64,
        variance: f64,
    },
    #[error("spot overflowed in trial {trial} at step {step}")]
    SpotOverflow { trial: usize, step: usize },
    #[error("trial {trial} has no sample at step {step}")]
    MissingObservation { trial: usize, step: usize },
}
