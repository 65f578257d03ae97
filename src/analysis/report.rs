use crate::core::CurrencyPair;
use crate::hedging::{HedgeStrategy, StrategyResult};
use crate::model::HestonParameters;
use crate::risk::{MetricsError, RiskReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the comparison: a strategy, what it cost, and how its NPV
/// distribution compares with the unhedged baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub strategy: HedgeStrategy,
    /// Present value of premiums paid at inception (domestic currency).
    pub upfront_cost: f64,
    pub report: RiskReport,
    /// `1 - σ_strategy / σ_unhedged`; zero when the baseline has no spread.
    pub volatility_reduction: f64,
    /// `VaR95_strategy - VaR95_unhedged`; positive means a better tail.
    pub var95_improvement: f64,
}

/// Side-by-side risk comparison of every evaluated strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub pair: CurrencyPair,
    pub parameters: HestonParameters,
    /// Constant domestic short rate used in the simulation.
    pub r_domestic: f64,
    /// Constant foreign short rate used in the simulation.
    pub r_foreign: f64,
    pub trials: usize,
    pub outcomes: Vec<StrategyOutcome>,
}

impl ComparisonTable {
    /// Summarise strategy results against the Unhedged row (or the first
    /// row when no Unhedged result is present).
    pub fn from_results(
        pair: CurrencyPair,
        parameters: HestonParameters,
        r_domestic: f64,
        r_foreign: f64,
        results: &[StrategyResult],
    ) -> Result<Self, MetricsError> {
        let reports = results
            .iter()
            .map(|r| RiskReport::from_npvs(&r.per_path_npv))
            .collect::<Result<Vec<_>, _>>()?;

        let baseline_idx = results
            .iter()
            .position(|r| r.strategy == HedgeStrategy::Unhedged)
            .unwrap_or(0);
        let baseline = reports.get(baseline_idx).copied();

        let outcomes = results
            .iter()
            .zip(reports)
            .map(|(result, report)| {
                let (volatility_reduction, var95_improvement) = match baseline {
                    Some(base) => {
                        let reduction = if base.std_dev > 0.0 {
                            1.0 - report.std_dev / base.std_dev
                        } else {
                            0.0
                        };
                        (reduction, report.var_95 - base.var_95)
                    }
                    None => (0.0, 0.0),
                };
                StrategyOutcome {
                    strategy: result.strategy,
                    upfront_cost: result.upfront_cost,
                    report,
                    volatility_reduction,
                    var95_improvement,
                }
            })
            .collect();

        Ok(Self {
            pair,
            parameters,
            r_domestic,
            r_foreign,
            trials: baseline.map(|b| b.trials).unwrap_or(0),
            outcomes,
        })
    }

    /// Row for the first strategy with the given variant name.
    pub fn outcome(&self, name: &str) -> Option<&StrategyOutcome> {
        self.outcomes.iter().find(|o| o.strategy.name() == name)
    }

    pub fn baseline(&self) -> Option<&StrategyOutcome> {
        self.outcome(HedgeStrategy::Unhedged.name())
    }

    /// The strategy with the highest 95% VaR level (least bad tail).
    pub fn best_var95(&self) -> Option<&StrategyOutcome> {
        self.outcomes
            .iter()
            .max_by(|a, b| a.report.var_95.total_cmp(&b.report.var_95))
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.parameters;
        writeln!(f, "=== FX Hedge Comparison ({}) ===", self.pair)?;
        writeln!(f, "Trials:        {}", self.trials)?;
        writeln!(
            f,
            "Heston:        v0={:.6} kappa={:.4} theta={:.6} xi={:.4} rho={:.2}",
            p.v0, p.kappa, p.theta, p.xi, p.rho
        )?;
        writeln!(
            f,
            "Short rates:   {} {:.3}%  {} {:.3}%",
            self.pair.domestic(),
            self.r_domestic * 100.0,
            self.pair.foreign(),
            self.r_foreign * 100.0
        )?;

        writeln!(
            f,
            "\n{:<20} {:>14} {:>16} {:>14} {:>16} {:>16} {:>9} {:>14}",
            "Strategy", "Upfront Cost", "Mean NPV", "Std Dev", "VaR 95%", "CVaR 95%", "Vol Red.", "VaR95 Impr."
        )?;
        for o in &self.outcomes {
            writeln!(
                f,
                "{:<20} {:>14.0} {:>16.0} {:>14.0} {:>16.0} {:>16.0} {:>8.1}% {:>14.0}",
                o.strategy.to_string(),
                o.upfront_cost,
                o.report.mean,
                o.report.std_dev,
                o.report.var_95,
                o.report.cvar_95,
                o.volatility_reduction * 100.0,
                o.var95_improvement
            )?;
        }

        for o in &self.outcomes {
            writeln!(f, "\n{}:", o.strategy)?;
            write!(f, "{}", o.report)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result(strategy: HedgeStrategy, upfront_cost: f64, npvs: Vec<f64>) -> StrategyResult {
        StrategyResult {
            strategy,
            upfront_cost,
            per_path_npv: npvs,
        }
    }

    fn table() -> ComparisonTable {
        let unhedged: Vec<f64> = (0..100).map(|i| 1_000.0 + 10.0 * (i as f64 - 50.0)).collect();
        let forward: Vec<f64> = (0..100).map(|i| 1_000.0 + 2.0 * (i as f64 - 50.0)).collect();
        let flat = vec![990.0; 100];
        ComparisonTable::from_results(
            CurrencyPair::default(),
            HestonParameters::new(0.0036, 2.0, 0.0049, 0.3, -0.7),
            0.04,
            0.025,
            &[
                result(HedgeStrategy::Unhedged, 0.0, unhedged),
                result(HedgeStrategy::Forward, 0.0, forward),
                result(HedgeStrategy::Put, 10.0, flat),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_baseline_comparisons() {
        let t = table();
        assert_eq!(t.trials, 100);
        let base = t.baseline().unwrap();
        assert_eq!(base.volatility_reduction, 0.0);
        assert_eq!(base.var95_improvement, 0.0);

        let fwd = t.outcome("Forward").unwrap();
        assert_relative_eq!(fwd.volatility_reduction, 0.8, epsilon = 1e-12);
        assert!(fwd.var95_improvement > 0.0);

        let put = t.outcome("Put").unwrap();
        assert_relative_eq!(put.volatility_reduction, 1.0, epsilon = 1e-12);
        assert_eq!(put.upfront_cost, 10.0);
    }

    #[test]
    fn test_best_var95() {
        assert_eq!(table().best_var95().unwrap().strategy, HedgeStrategy::Put);
    }

    #[test]
    fn test_short_sample_rejected() {
        let err = ComparisonTable::from_results(
            CurrencyPair::default(),
            HestonParameters::new(0.04, 2.0, 0.04, 0.3, -0.7),
            0.04,
            0.025,
            &[result(HedgeStrategy::Unhedged, 0.0, vec![1.0])],
        )
        .unwrap_err();
        assert_eq!(err, MetricsError::TooFewObservations(1));
    }

    #[test]
    fn test_display_lists_every_strategy() {
        let text = table().to_string();
        assert!(text.starts_with("=== FX Hedge Comparison (EUR/USD) ==="));
        assert!(text.contains("Unhedged"));
        assert!(text.contains("Forward"));
        assert!(text.contains("Put"));
        assert!(text.contains("VaR 99%"));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(table()).unwrap();
        assert_eq!(json["outcomes"].as_array().unwrap().len(), 3);
        assert_eq!(json["outcomes"][1]["strategy"]["kind"], "forward");
        assert_eq!(json["trials"], 100);
    }
}
