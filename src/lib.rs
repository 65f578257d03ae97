//! # fx-hedge-engine
//!
//! Monte Carlo evaluation of FX hedging strategies for a schedule of
//! foreign-currency cash flows.
//!
//! Given a schedule of foreign-currency cash flows, a spot rate, domestic
//! and foreign rate curves and market ATM vols, this engine calibrates a
//! Heston stochastic-volatility model, simulates spot paths, and compares
//! the domestic-currency NPV distribution of each hedging strategy.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: currencies, rate curves, cash-flow schedules, ATM vols
//! - **model** — Heston parameters and calibration to ATM vols
//! - **simulation** — Full-truncation Heston path simulation with per-trial random streams
//! - **hedging** — Unhedged, forward, put and collar overlays; Garman–Kohlhagen pricing
//! - **risk** — Mean, standard deviation, VaR and CVaR of NPV distributions
//! - **analysis** — End-to-end orchestration and the strategy comparison table

pub mod analysis;
pub mod core;
pub mod error;
pub mod hedging;
pub mod model;
pub mod risk;
pub mod simulation;

pub use error::{EngineError, Result};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::{AnalysisConfig, AnalysisInputs, ComparisonTable, HedgeAnalysis, StrategyOutcome};
    pub use crate::core::cashflow::{CashFlow, CashFlowSchedule};
    pub use crate::core::currency::{CurrencyCode, CurrencyPair};
    pub use crate::core::curve::RateCurve;
    pub use crate::core::volatility::MarketVolPoint;
    pub use crate::error::{EngineError, Result};
    pub use crate::hedging::strategy::{HedgeMarket, HedgeStrategy, StrategyResult};
    pub use crate::model::calibration::HestonCalibrator;
    pub use crate::model::heston::HestonParameters;
    pub use crate::risk::metrics::RiskReport;
    pub use crate::simulation::paths::{PathSimulator, SimulationConfig};
}
