use super::config::{AnalysisConfig, OptionVolSource, RateHorizon};
use super::report::ComparisonTable;
use crate::core::{AtmVolCurve, CashFlowSchedule, ConfigurationError, CurrencyPair, MarketVolPoint, RateCurve};
use crate::error::Result;
use crate::hedging::{HedgeMarket, HedgeStrategy, OptionVol, StrategyResult};
use crate::model::{Calibration, HestonCalibrator};
use crate::simulation::{PathSimulator, SimulationConfig};
use log::info;

/// Market data and exposure for one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInputs {
    pub pair: CurrencyPair,
    pub schedule: CashFlowSchedule,
    /// Domestic units per unit of foreign currency.
    pub spot: f64,
    pub domestic: RateCurve,
    pub foreign: RateCurve,
    pub market_vols: Vec<MarketVolPoint>,
}

/// Everything the pipeline produced before summarising into a table.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyEvaluation {
    pub calibration: Calibration,
    /// Constant domestic short rate fed to the simulator.
    pub r_domestic: f64,
    /// Constant foreign short rate fed to the simulator.
    pub r_foreign: f64,
    pub results: Vec<StrategyResult>,
}

/// Calibrate, simulate, hedge and measure, in that order.
///
/// ```no_run
/// use fx_hedge_engine::prelude::*;
/// # fn inputs() -> AnalysisInputs { unimplemented!() }
///
/// let analysis = HedgeAnalysis::new(inputs(), AnalysisConfig::default()).unwrap();
/// let table = analysis.run().unwrap();
/// println!("{}", table);
/// ```
#[derive(Debug, Clone)]
pub struct HedgeAnalysis {
    inputs: AnalysisInputs,
    config: AnalysisConfig,
}

impl HedgeAnalysis {
    pub fn new(inputs: AnalysisInputs, config: AnalysisConfig) -> Result<Self> {
        if !inputs.spot.is_finite() || inputs.spot <= 0.0 {
            return Err(ConfigurationError::InvalidSpot(inputs.spot).into());
        }
        for (role, curve, expected) in [
            ("domestic", &inputs.domestic, inputs.pair.domestic()),
            ("foreign", &inputs.foreign, inputs.pair.foreign()),
        ] {
            if curve.currency() != expected {
                return Err(ConfigurationError::CurveCurrencyMismatch {
                    role,
                    expected: expected.clone(),
                    got: curve.currency().clone(),
                }
                .into());
            }
        }
        config.validate()?;
        Ok(Self { inputs, config })
    }

    pub fn inputs(&self) -> &AnalysisInputs {
        &self.inputs
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The strategies compared by [`run`](Self::run), in report order.
    pub fn strategies(&self) -> [HedgeStrategy; 4] {
        [
            HedgeStrategy::Unhedged,
            HedgeStrategy::Forward,
            HedgeStrategy::Put,
            HedgeStrategy::Collar {
                put_level: self.config.collar_put_level,
                call_level: self.config.collar_call_level,
            },
        ]
    }

    /// Fit the Heston model to the market ATM vols.
    pub fn calibrate(&self) -> Result<Calibration> {
        let calibration = HestonCalibrator::new(self.config.rho, self.config.xi)
            .with_initial_guess(self.config.initial_guess)
            .with_max_iterations(self.config.max_iterations)
            .calibrate(&self.inputs.market_vols)?;
        let p = calibration.parameters;
        info!(
            "calibrated Heston to {} vol point(s): v0={:.6} kappa={:.4} theta={:.6} (objective {:e})",
            self.inputs.market_vols.len(),
            p.v0,
            p.kappa,
            p.theta,
            calibration.objective
        );
        Ok(calibration)
    }

    /// Year fraction at which the constant short rates are sampled.
    pub fn rate_horizon(&self) -> f64 {
        match self.config.rate_horizon {
            RateHorizon::FinalCashFlow => self.inputs.schedule.horizon(),
            RateHorizon::Fixed(t) => t,
        }
    }

    fn hedge_market(&self, calibration: &Calibration) -> Result<HedgeMarket> {
        let option_vol = match self.config.option_vol {
            OptionVolSource::MarketAtm => OptionVol::MarketAtm(AtmVolCurve::new(&self.inputs.market_vols)?),
            OptionVolSource::HestonEquivalent => OptionVol::HestonEquivalent(calibration.parameters),
        };
        Ok(HedgeMarket::new(
            self.inputs.spot,
            self.inputs.domestic.clone(),
            self.inputs.foreign.clone(),
            option_vol,
        )?)
    }

    /// Calibrate and simulate, then evaluate every strategy on the same paths.
    pub fn evaluate_strategies(&self) -> Result<StrategyEvaluation> {
        let calibration = self.calibrate()?;
        let schedule = &self.inputs.schedule;

        let horizon = self.rate_horizon();
        let r_domestic = self.inputs.domestic.rate(horizon);
        let r_foreign = self.inputs.foreign.rate(horizon);
        info!(
            "short rates at {:.3}y: domestic {:.4}%, foreign {:.4}%",
            horizon,
            r_domestic * 100.0,
            r_foreign * 100.0
        );

        let sim_config = SimulationConfig::new(self.inputs.spot, r_domestic, r_foreign)
            .with_trials(self.config.trials)
            .with_seed(self.config.seed)
            .with_time_step(self.config.time_step);
        let simulator = PathSimulator::new(calibration.parameters, sim_config, schedule.times())?;
        let paths = simulator.simulate()?;
        info!(
            "simulated {} paths over {} steps",
            paths.len(),
            simulator.total_steps()
        );

        let flow_steps: Vec<usize> = schedule.times().iter().map(|&t| simulator.step_index(t)).collect();
        let market = self.hedge_market(&calibration)?;

        let results = self
            .strategies()
            .iter()
            .map(|strategy| -> Result<StrategyResult> {
                let result = strategy.evaluate(schedule, &market, &paths, &flow_steps)?;
                info!("{}: upfront cost {:.2}", strategy, result.upfront_cost);
                Ok(result)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StrategyEvaluation {
            calibration,
            r_domestic,
            r_foreign,
            results,
        })
    }

    /// Run the full pipeline and summarise it.
    pub fn run(&self) -> Result<ComparisonTable> {
        let evaluation = self.evaluate_strategies()?;
        let table = ComparisonTable::from_results(
            self.inputs.pair.clone(),
            evaluation.calibration.parameters,
            evaluation.r_domestic,
            evaluation.r_foreign,
            &evaluation.results,
        )?;
        for o in &table.outcomes {
            info!(
                "{}: mean {:.0}, std {:.0}, VaR95 {:.0}, vol reduction {:.1}%",
                o.strategy,
                o.report.mean,
                o.report.std_dev,
                o.report.var_95,
                o.volatility_reduction * 100.0
            );
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CurrencyCode;
    use crate::error::EngineError;
    use crate::model::CalibrationError;
    use crate::simulation::SimulationError;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn inputs() -> AnalysisInputs {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        AnalysisInputs {
            pair: CurrencyPair::default(),
            schedule: CashFlowSchedule::from_signed(
                d(2025, 8, 1),
                vec![
                    (d(2025, 10, 1), dec!(-10_000_000)),
                    (d(2026, 10, 1), dec!(1_000_000)),
                    (d(2027, 10, 1), dec!(11_000_000)),
                ],
            )
            .unwrap(),
            spot: 1.10,
            domestic: RateCurve::flat(CurrencyCode::new("USD"), 0.04).unwrap(),
            foreign: RateCurve::flat(CurrencyCode::new("EUR"), 0.025).unwrap(),
            market_vols: vec![MarketVolPoint::new(1.0, 0.06), MarketVolPoint::new(5.0, 0.07)],
        }
    }

    fn small_config() -> AnalysisConfig {
        AnalysisConfig::default().with_trials(200)
    }

    #[test]
    fn test_run_produces_all_strategies() {
        let table = HedgeAnalysis::new(inputs(), small_config()).unwrap().run().unwrap();
        assert_eq!(table.outcomes.len(), 4);
        assert_eq!(table.trials, 200);
        assert_eq!(table.r_domestic, 0.04);
        assert_eq!(table.r_foreign, 0.025);

        let names: Vec<&str> = table.outcomes.iter().map(|o| o.strategy.name()).collect();
        assert_eq!(names, ["Unhedged", "Forward", "Put", "Collar"]);

        let forward = table.outcome("Forward").unwrap();
        let unhedged = table.baseline().unwrap();
        assert!(forward.report.std_dev < unhedged.report.std_dev);
        assert!(table.outcome("Put").unwrap().upfront_cost > 0.0);
    }

    #[test]
    fn test_run_is_reproducible() {
        let a = HedgeAnalysis::new(inputs(), small_config()).unwrap().run().unwrap();
        let b = HedgeAnalysis::new(inputs(), small_config()).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_heston_equivalent_option_vol() {
        let config = small_config().with_option_vol(OptionVolSource::HestonEquivalent);
        let table = HedgeAnalysis::new(inputs(), config).unwrap().run().unwrap();
        assert!(table.outcome("Put").unwrap().upfront_cost > 0.0);
    }

    #[test]
    fn test_fixed_rate_horizon() {
        let analysis = HedgeAnalysis::new(inputs(), small_config().with_rate_horizon(RateHorizon::Fixed(5.0))).unwrap();
        assert_eq!(analysis.rate_horizon(), 5.0);
    }

    #[test]
    fn test_final_cash_flow_horizon() {
        let analysis = HedgeAnalysis::new(inputs(), small_config()).unwrap();
        assert_eq!(analysis.rate_horizon(), analysis.inputs().schedule.horizon());
    }

    #[test]
    fn test_rejects_bad_spot() {
        let mut bad = inputs();
        bad.spot = -1.0;
        assert_eq!(
            HedgeAnalysis::new(bad, small_config()).unwrap_err(),
            EngineError::Configuration(ConfigurationError::InvalidSpot(-1.0))
        );
    }

    #[test]
    fn test_rejects_swapped_curves() {
        let mut bad = inputs();
        std::mem::swap(&mut bad.domestic, &mut bad.foreign);
        assert!(matches!(
            HedgeAnalysis::new(bad, small_config()),
            Err(EngineError::Configuration(ConfigurationError::CurveCurrencyMismatch { role: "domestic", .. }))
        ));
    }

    #[test]
    fn test_no_vols_is_calibration_error() {
        let mut bad = inputs();
        bad.market_vols.clear();
        let err = HedgeAnalysis::new(bad, small_config()).unwrap().run().unwrap_err();
        assert_eq!(
            err,
            EngineError::Calibration(CalibrationError::InsufficientData { supplied: 0 })
        );
    }

    #[test]
    fn test_zero_trials_is_simulation_error() {
        let err = HedgeAnalysis::new(inputs(), small_config().with_trials(0))
            .unwrap()
            .run()
            .unwrap_err();
        assert_eq!(err, EngineError::Simulation(SimulationError::InvalidTrialCount(0)));
    }
}
