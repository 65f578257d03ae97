//! End-to-end hedge comparison: calibration, simulation, strategy
//! evaluation and risk summary.

pub mod config;
pub mod orchestrator;
pub mod report;

pub use config::{AnalysisConfig, OptionVolSource, RateHorizon};
pub use orchestrator::{AnalysisInputs, HedgeAnalysis, StrategyEvaluation};
pub use report::{ComparisonTable, StrategyOutcome};
