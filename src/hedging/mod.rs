//! Hedging overlays on foreign-currency inflows and their per-path payoffs.

pub mod black_scholes;
pub mod strategy;

pub use black_scholes::{garman_kohlhagen, OptionKind};
pub use strategy::{HedgeMarket, HedgeStrategy, OptionVol, StrategyResult};
