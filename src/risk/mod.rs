//! Risk statistics over simulated NPV distributions.

pub mod metrics;

pub use metrics::{conditional_value_at_risk, mean, quantile, std_dev, value_at_risk, RiskReport};

use thiserror::Error;

/// Degenerate or out-of-range statistical inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("at least 2 observations are required, got {0}")]
    TooFewObservations(usize),
    #[error("confidence must lie strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),
    #[error("probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("observation {index} is not finite")]
    NonFiniteObservation { index: usize },
}
