use super::ConfigurationError;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

const DAYS_PER_YEAR: f64 = 365.0;

/// Actual/365 year fraction between two dates.
///
/// Used for every maturity in the engine: discounting, forwards, option
/// expiries and simulation step lookup.
pub fn year_fraction(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Whether a cash flow is received or paid in the foreign currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inflow,
    Outflow,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inflow => write!(f, "inflow"),
            Direction::Outflow => write!(f, "outflow"),
        }
    }
}

/// A single foreign-currency cash flow.
///
/// The amount is always stored as a positive magnitude; the sign lives in
/// [`Direction`].
///
/// # Examples
///
/// ```
/// use fx_hedge_engine::core::cashflow::{CashFlow, Direction};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
/// let flow = CashFlow::from_signed(date, dec!(-10_000_000));
///
/// assert_eq!(flow.direction(), Direction::Outflow);
/// assert_eq!(flow.amount(), dec!(10_000_000));
/// assert_eq!(flow.signed_amount(), dec!(-10_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    date: NaiveDate,
    amount: Decimal,
    direction: Direction,
}

impl CashFlow {
    pub fn inflow(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount: amount.abs(),
            direction: Direction::Inflow,
        }
    }

    pub fn outflow(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount: amount.abs(),
            direction: Direction::Outflow,
        }
    }

    /// Build from a signed amount: positive is received, negative is paid.
    pub fn from_signed(date: NaiveDate, amount: Decimal) -> Self {
        if amount < Decimal::ZERO {
            Self::outflow(date, amount)
        } else {
            Self::inflow(date, amount)
        }
    }

    // --- Accessors ---

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_inflow(&self) -> bool {
        self.direction == Direction::Inflow
    }

    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Inflow => self.amount,
            Direction::Outflow => -self.amount,
        }
    }

    /// Signed amount as a float, for the numerical core.
    pub fn signed_amount_f64(&self) -> Result<f64, ConfigurationError> {
        let signed = self.signed_amount();
        signed
            .to_f64()
            .filter(|v| v.is_finite())
            .ok_or(ConfigurationError::AmountNotRepresentable { amount: signed })
    }
}

/// An ordered, validated schedule of foreign-currency cash flows, anchored
/// at a valuation date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowSchedule {
    valuation_date: NaiveDate,
    flows: Vec<CashFlow>,
    /// Cached year fractions, one per flow.
    #[serde(skip)]
    times: Vec<f64>,
    /// Cached signed float amounts, one per flow.
    #[serde(skip)]
    amounts: Vec<f64>,
}

impl CashFlowSchedule {
    /// Validate and build a schedule.
    ///
    /// Flows must be non-empty, dated on or after the valuation date, in
    /// non-decreasing date order, and carry non-zero amounts.
    pub fn new(valuation_date: NaiveDate, flows: Vec<CashFlow>) -> Result<Self, ConfigurationError> {
        if flows.is_empty() {
            return Err(ConfigurationError::EmptySchedule);
        }

        let mut times = Vec::with_capacity(flows.len());
        let mut amounts = Vec::with_capacity(flows.len());
        for (index, flow) in flows.iter().enumerate() {
            if flow.date < valuation_date {
                return Err(ConfigurationError::FlowBeforeValuation {
                    date: flow.date,
                    valuation_date,
                });
            }
            if index > 0 && flow.date < flows[index - 1].date {
                return Err(ConfigurationError::UnorderedSchedule {
                    index,
                    date: flow.date,
                });
            }
            if flow.amount.is_zero() {
                return Err(ConfigurationError::ZeroAmount { date: flow.date });
            }
            times.push(year_fraction(valuation_date, flow.date));
            amounts.push(flow.signed_amount_f64()?);
        }

        Ok(Self {
            valuation_date,
            flows,
            times,
            amounts,
        })
    }

    /// Build from `(date, signed amount)` pairs.
    pub fn from_signed(
        valuation_date: NaiveDate,
        flows: impl IntoIterator<Item = (NaiveDate, Decimal)>,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            valuation_date,
            flows
                .into_iter()
                .map(|(date, amount)| CashFlow::from_signed(date, amount))
                .collect(),
        )
    }

    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Year fraction of each flow from the valuation date.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Signed float amount of each flow.
    pub fn signed_amounts(&self) -> &[f64] {
        &self.amounts
    }

    /// Year fraction of the last flow.
    pub fn horizon(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    pub fn inflows(&self) -> impl Iterator<Item = &CashFlow> {
        self.flows.iter().filter(|f| f.is_inflow())
    }

    pub fn outflows(&self) -> impl Iterator<Item = &CashFlow> {
        self.flows.iter().filter(|f| !f.is_inflow())
    }

    /// Sum of signed foreign amounts.
    pub fn net_foreign_amount(&self) -> Decimal {
        self.flows.iter().map(|f| f.signed_amount()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reference_schedule() -> CashFlowSchedule {
        CashFlowSchedule::from_signed(
            date(2025, 8, 1),
            vec![
                (date(2025, 10, 1), dec!(-10_000_000)),
                (date(2026, 10, 1), dec!(1_000_000)),
                (date(2027, 10, 1), dec!(1_000_000)),
                (date(2029, 10, 1), dec!(1_000_000)),
                (date(2030, 10, 1), dec!(11_000_000)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_year_fraction_act_365() {
        assert_relative_eq!(year_fraction(date(2025, 8, 1), date(2025, 10, 1)), 61.0 / 365.0);
        assert_eq!(year_fraction(date(2025, 8, 1), date(2025, 8, 1)), 0.0);
    }

    #[test]
    fn test_schedule_accessors() {
        let schedule = reference_schedule();
        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule.inflows().count(), 4);
        assert_eq!(schedule.outflows().count(), 1);
        assert_eq!(schedule.net_foreign_amount(), dec!(4_000_000));
        assert_eq!(schedule.signed_amounts()[0], -10_000_000.0);
        assert_relative_eq!(schedule.horizon(), 1887.0 / 365.0);
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let err = CashFlowSchedule::new(date(2025, 8, 1), vec![]).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptySchedule);
    }

    #[test]
    fn test_unordered_schedule_rejected() {
        let err = CashFlowSchedule::from_signed(
            date(2025, 8, 1),
            vec![
                (date(2027, 1, 1), dec!(100)),
                (date(2026, 1, 1), dec!(100)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnorderedSchedule { index: 1, .. }));
    }

    #[test]
    fn test_flow_before_valuation_rejected() {
        let err = CashFlowSchedule::from_signed(date(2025, 8, 1), vec![(date(2025, 7, 1), dec!(5))])
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::FlowBeforeValuation { .. }));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = CashFlowSchedule::from_signed(date(2025, 8, 1), vec![(date(2026, 8, 1), dec!(0))])
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ZeroAmount { .. }));
    }

    #[test]
    fn test_direction_from_sign() {
        let d = date(2026, 1, 1);
        assert!(CashFlow::from_signed(d, dec!(1)).is_inflow());
        assert!(!CashFlow::from_signed(d, dec!(-1)).is_inflow());
        assert_eq!(CashFlow::outflow(d, dec!(-7)).amount(), dec!(7));
    }
}
