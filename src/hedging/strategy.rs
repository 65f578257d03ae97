use super::black_scholes::{garman_kohlhagen, OptionKind};
use crate::core::{AtmVolCurve, CashFlowSchedule, ConfigurationError, RateCurve};
use crate::error::Result;
use crate::model::HestonParameters;
use crate::simulation::{SimulatedPath, SimulationError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_COLLAR_PUT_LEVEL: f64 = 0.95;
pub const DEFAULT_COLLAR_CALL_LEVEL: f64 = 1.05;

/// Flat volatility fed to the option premium formula.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionVol {
    /// Interpolated market ATM vol at the option's expiry.
    MarketAtm(AtmVolCurve),
    /// Model ATM-equivalent vol, `sqrt(E[avg variance over [0, T]])`.
    HestonEquivalent(HestonParameters),
}

impl OptionVol {
    pub fn vol(&self, t: f64) -> f64 {
        match self {
            OptionVol::MarketAtm(curve) => curve.vol(t),
            OptionVol::HestonEquivalent(params) => params.atm_vol(t),
        }
    }
}

/// Everything a strategy needs from the market to price and settle.
#[derive(Debug, Clone, PartialEq)]
pub struct HedgeMarket {
    spot: f64,
    domestic: RateCurve,
    foreign: RateCurve,
    option_vol: OptionVol,
}

impl HedgeMarket {
    pub fn new(
        spot: f64,
        domestic: RateCurve,
        foreign: RateCurve,
        option_vol: OptionVol,
    ) -> std::result::Result<Self, ConfigurationError> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(ConfigurationError::InvalidSpot(spot));
        }
        Ok(Self {
            spot,
            domestic,
            foreign,
            option_vol,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn domestic(&self) -> &RateCurve {
        &self.domestic
    }

    pub fn foreign(&self) -> &RateCurve {
        &self.foreign
    }

    pub fn option_vol(&self) -> &OptionVol {
        &self.option_vol
    }

    /// Covered interest parity forward: `spot · exp((r_d(T) - r_f(T)) T)`.
    pub fn forward_rate(&self, t: f64) -> f64 {
        self.spot * ((self.domestic.rate(t) - self.foreign.rate(t)) * t).exp()
    }

    /// Domestic discount factor.
    pub fn discount_factor(&self, t: f64) -> f64 {
        self.domestic.discount_factor(t)
    }

    /// Garman–Kohlhagen premium per unit of foreign notional, expiring at `t`.
    pub fn option_premium(&self, kind: OptionKind, strike: f64, t: f64) -> f64 {
        garman_kohlhagen(
            kind,
            self.spot,
            strike,
            t,
            self.domestic.rate(t),
            self.foreign.rate(t),
            self.option_vol.vol(t),
        )
    }
}

/// The hedging overlays applied to foreign-currency inflows.
///
/// Outflows are never hedged: every strategy converts them at the
/// simulated spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HedgeStrategy {
    /// Convert everything at the simulated spot.
    Unhedged,
    /// Sell each inflow forward at the covered-interest-parity rate.
    Forward,
    /// Buy an ATM put (strike = spot) on each inflow.
    Put,
    /// Buy a put at `put_level · spot` and sell a call at `call_level · spot`.
    Collar { put_level: f64, call_level: f64 },
}

impl HedgeStrategy {
    /// The 95%/105% collar.
    pub fn collar() -> Self {
        HedgeStrategy::Collar {
            put_level: DEFAULT_COLLAR_PUT_LEVEL,
            call_level: DEFAULT_COLLAR_CALL_LEVEL,
        }
    }

    /// Unhedged, Forward, Put and the default collar, in report order.
    pub fn all() -> [HedgeStrategy; 4] {
        [
            HedgeStrategy::Unhedged,
            HedgeStrategy::Forward,
            HedgeStrategy::Put,
            HedgeStrategy::collar(),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            HedgeStrategy::Unhedged => "Unhedged",
            HedgeStrategy::Forward => "Forward",
            HedgeStrategy::Put => "Put",
            HedgeStrategy::Collar { .. } => "Collar",
        }
    }

    fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if let HedgeStrategy::Collar {
            put_level,
            call_level,
        } = *self
        {
            if !put_level.is_finite() || put_level <= 0.0 {
                return Err(ConfigurationError::InvalidParameter {
                    name: "collar_put_level",
                    value: put_level,
                });
            }
            if !call_level.is_finite() || call_level < put_level {
                return Err(ConfigurationError::InvalidParameter {
                    name: "collar_call_level",
                    value: call_level,
                });
            }
        }
        Ok(())
    }

    /// Present value of the premium paid up front, in domestic currency.
    ///
    /// Zero for Unhedged and Forward. For options, one contract per inflow
    /// sized to the inflow's foreign amount and expiring on its date.
    pub fn price(
        &self,
        schedule: &CashFlowSchedule,
        market: &HedgeMarket,
    ) -> std::result::Result<f64, ConfigurationError> {
        self.validate()?;
        let spot = market.spot();
        let inflows = schedule
            .times()
            .iter()
            .zip(schedule.signed_amounts())
            .filter(|(_, &amount)| amount > 0.0);

        let cost: f64 = match *self {
            HedgeStrategy::Unhedged | HedgeStrategy::Forward => 0.0,
            HedgeStrategy::Put => inflows
                .map(|(&t, &amount)| amount * market.option_premium(OptionKind::Put, spot, t))
                .sum(),
            HedgeStrategy::Collar {
                put_level,
                call_level,
            } => inflows
                .map(|(&t, &amount)| {
                    let long_put = market.option_premium(OptionKind::Put, put_level * spot, t);
                    let short_call = market.option_premium(OptionKind::Call, call_level * spot, t);
                    amount * (long_put - short_call)
                })
                .sum(),
        };
        Ok(cost)
    }

    /// Domestic proceeds of a signed foreign `amount` falling due at `t`,
    /// given the simulated spot on that date.
    pub fn hedged_proceeds(&self, amount: f64, t: f64, simulated_spot: f64, market: &HedgeMarket) -> f64 {
        if amount <= 0.0 {
            return amount * simulated_spot;
        }
        let spot = market.spot();
        let rate = match *self {
            HedgeStrategy::Unhedged => simulated_spot,
            HedgeStrategy::Forward => market.forward_rate(t),
            HedgeStrategy::Put => simulated_spot.max(spot),
            HedgeStrategy::Collar {
                put_level,
                call_level,
            } => simulated_spot.max(put_level * spot).min(call_level * spot),
        };
        amount * rate
    }

    /// Price the strategy and compute one NPV per path.
    ///
    /// `flow_steps[k]` is the simulation step at which flow `k` settles.
    /// Each path's NPV is the sum of its hedged proceeds, each discounted on
    /// the domestic curve from its own date, minus the upfront cost.
    pub fn evaluate(
        &self,
        schedule: &CashFlowSchedule,
        market: &HedgeMarket,
        paths: &[SimulatedPath],
        flow_steps: &[usize],
    ) -> Result<StrategyResult> {
        if flow_steps.len() != schedule.len() {
            return Err(ConfigurationError::ScheduleMismatch {
                expected: schedule.len(),
                got: flow_steps.len(),
            }
            .into());
        }
        let upfront_cost = self.price(schedule, market)?;

        let discounts: Vec<f64> = schedule
            .times()
            .iter()
            .map(|&t| market.discount_factor(t))
            .collect();

        let per_path_npv = paths
            .par_iter()
            .map(|path| -> std::result::Result<f64, SimulationError> {
                let mut pv = 0.0;
                for (k, (&t, &amount)) in schedule.times().iter().zip(schedule.signed_amounts()).enumerate() {
                    let step = flow_steps[k];
                    let spot = path.spot_at_step(step).ok_or(SimulationError::MissingObservation {
                        trial: path.trial(),
                        step,
                    })?;
                    pv += discounts[k] * self.hedged_proceeds(amount, t, spot, market);
                }
                Ok(pv - upfront_cost)
            })
            .collect::<std::result::Result<Vec<f64>, _>>()?;

        Ok(StrategyResult {
            strategy: *self,
            upfront_cost,
            per_path_npv,
        })
    }
}

impl fmt::Display for HedgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HedgeStrategy::Collar {
                put_level,
                call_level,
            } => write!(
                f,
                "Collar ({:.0}%/{:.0}%)",
                put_level * 100.0,
                call_level * 100.0
            ),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Upfront cost and per-path NPVs of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: HedgeStrategy,
    pub upfront_cost: f64,
    /// One NPV per simulated trial, in trial order.
    pub per_path_npv: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrencyCode, MarketVolPoint};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn market() -> HedgeMarket {
        HedgeMarket::new(
            1.10,
            RateCurve::flat(CurrencyCode::new("USD"), 0.04).unwrap(),
            RateCurve::flat(CurrencyCode::new("EUR"), 0.025).unwrap(),
            OptionVol::MarketAtm(
                AtmVolCurve::new(&[MarketVolPoint::new(1.0, 0.06), MarketVolPoint::new(5.0, 0.07)])
                    .unwrap(),
            ),
        )
        .unwrap()
    }

    fn schedule() -> CashFlowSchedule {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        CashFlowSchedule::from_signed(
            d(2025, 8, 1),
            vec![
                (d(2025, 10, 1), dec!(-10_000_000)),
                (d(2026, 10, 1), dec!(1_000_000)),
                (d(2030, 10, 1), dec!(11_000_000)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_forward_rate_parity() {
        let m = market();
        assert_relative_eq!(m.forward_rate(2.0), 1.10 * (0.03f64).exp(), epsilon = 1e-12);
        assert_eq!(m.forward_rate(0.0), 1.10);
    }

    #[test]
    fn test_unhedged_and_forward_cost_nothing() {
        let m = market();
        assert_eq!(HedgeStrategy::Unhedged.price(&schedule(), &m).unwrap(), 0.0);
        assert_eq!(HedgeStrategy::Forward.price(&schedule(), &m).unwrap(), 0.0);
    }

    #[test]
    fn test_put_cost_sums_inflow_premiums() {
        let m = market();
        let s = schedule();
        let expected: f64 = s
            .times()
            .iter()
            .zip(s.signed_amounts())
            .filter(|(_, &a)| a > 0.0)
            .map(|(&t, &a)| a * m.option_premium(OptionKind::Put, 1.10, t))
            .sum();
        let cost = HedgeStrategy::Put.price(&s, &m).unwrap();
        assert_relative_eq!(cost, expected, max_relative = 1e-12);
        assert!(cost > 0.0);
    }

    #[test]
    fn test_collar_cheaper_than_put() {
        let m = market();
        let s = schedule();
        let put = HedgeStrategy::Put.price(&s, &m).unwrap();
        let collar = HedgeStrategy::collar().price(&s, &m).unwrap();
        assert!(collar < put);
    }

    #[test]
    fn test_outflows_always_unhedged() {
        let m = market();
        for strategy in HedgeStrategy::all() {
            assert_eq!(strategy.hedged_proceeds(-100.0, 1.0, 1.3, &m), -130.0);
        }
    }

    #[test]
    fn test_inflow_payoffs() {
        let m = market();
        let low = 0.9;
        let high = 1.3;
        assert_eq!(HedgeStrategy::Unhedged.hedged_proceeds(100.0, 1.0, low, &m), 100.0 * low);
        assert_relative_eq!(
            HedgeStrategy::Forward.hedged_proceeds(100.0, 1.0, low, &m),
            100.0 * m.forward_rate(1.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(HedgeStrategy::Put.hedged_proceeds(100.0, 1.0, low, &m), 110.0, epsilon = 1e-12);
        assert_eq!(HedgeStrategy::Put.hedged_proceeds(100.0, 1.0, high, &m), 130.0);
        assert_relative_eq!(
            HedgeStrategy::collar().hedged_proceeds(100.0, 1.0, low, &m),
            100.0 * 0.95 * 1.10,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            HedgeStrategy::collar().hedged_proceeds(100.0, 1.0, high, &m),
            100.0 * 1.05 * 1.10,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_invalid_collar_rejected() {
        let bad = HedgeStrategy::Collar {
            put_level: 1.1,
            call_level: 0.9,
        };
        assert!(bad.price(&schedule(), &market()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(HedgeStrategy::collar().to_string(), "Collar (95%/105%)");
        assert_eq!(HedgeStrategy::Put.to_string(), "Put");
    }

    #[test]
    fn test_heston_equivalent_vol() {
        let p = HestonParameters::new(0.0036, 2.0, 0.0049, 0.3, -0.7);
        let vol = OptionVol::HestonEquivalent(p);
        assert_relative_eq!(vol.vol(1.0), p.atm_vol(1.0));
    }
}
