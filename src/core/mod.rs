//! Foundational market and schedule types.

pub mod cashflow;
pub mod currency;
pub mod curve;
pub mod volatility;

pub use cashflow::{year_fraction, CashFlow, CashFlowSchedule, Direction};
pub use currency::{CurrencyCode, CurrencyPair};
pub use curve::RateCurve;
pub use volatility::{AtmVolCurve, MarketVolPoint};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Piecewise-linear lookup over nodes sorted by abscissa, held flat beyond
/// the first and last node. A NaN abscissa yields NaN.
pub(crate) fn interpolate_flat<T>(nodes: &[T], x: f64, node: impl Fn(&T) -> (f64, f64)) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let (first_x, first_y) = node(&nodes[0]);
    let (last_x, last_y) = node(&nodes[nodes.len() - 1]);
    if x <= first_x {
        return first_y;
    }
    if x >= last_x {
        return last_y;
    }

    // First node strictly beyond x; x > first_x guarantees idx >= 1.
    let idx = nodes.partition_point(|n| node(n).0 <= x);
    let (x0, y0) = node(&nodes[idx - 1]);
    let (x1, y1) = node(&nodes[idx]);
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

/// Malformed curve, schedule or market inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("rate curve for {currency} has no tenor points")]
    EmptyCurve { currency: CurrencyCode },
    #[error("rate curve for {currency}: tenor {tenor} at index {index} does not exceed previous tenor {previous}")]
    NonIncreasingTenors {
        currency: CurrencyCode,
        index: usize,
        previous: f64,
        tenor: f64,
    },
    #[error("rate curve for {currency}: invalid point (tenor {tenor}, rate {rate})")]
    InvalidCurvePoint {
        currency: CurrencyCode,
        tenor: f64,
        rate: f64,
    },
    #[error("{role} curve is quoted in {got}, expected {expected}")]
    CurveCurrencyMismatch {
        role: &'static str,
        expected: CurrencyCode,
        got: CurrencyCode,
    },
    #[error("cash-flow schedule is empty")]
    EmptySchedule,
    #[error("cash flow at index {index} ({date}) is dated before its predecessor")]
    UnorderedSchedule { index: usize, date: NaiveDate },
    #[error("cash flow on {date} precedes valuation date {valuation_date}")]
    FlowBeforeValuation {
        date: NaiveDate,
        valuation_date: NaiveDate,
    },
    #[error("cash flow on {date} has zero amount")]
    ZeroAmount { date: NaiveDate },
    #[error("amount {amount} cannot be represented as a float")]
    AmountNotRepresentable { amount: Decimal },
    #[error("spot rate must be positive and finite, got {0}")]
    InvalidSpot(f64),
    #[error("invalid market vol point (maturity {maturity}, vol {vol})")]
    InvalidVolPoint { maturity: f64, vol: f64 },
    #[error("no market vol points supplied")]
    EmptyVolCurve,
    #[error("invalid currency pair '{0}'")]
    InvalidCurrencyPair(String),
    #[error("expected {expected} observation steps for the schedule, got {got}")]
    ScheduleMismatch { expected: usize, got: usize },
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
