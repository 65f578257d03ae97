use crate::core::ConfigurationError;
use crate::model::CalibrationError;
use crate::risk::MetricsError;
use crate::simulation::SimulationError;
use thiserror::Error;

/// Any failure raised by the engine.
///
/// Every variant is terminal for the run that raised it. The engine never
/// retries internally and never returns partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
