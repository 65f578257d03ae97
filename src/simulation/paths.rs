//! Heston path simulation with full truncation.
//!
//! Per step of length `dt`, with `v⁺ = max(v, 0)`:
//!
//! ```text
//! ln S ← ln S + (r_d - r_f - v⁺/2) dt + sqrt(v⁺ dt) Z_s
//! v    ← max(v + kappa (theta - v⁺) dt + xi sqrt(v⁺ dt) Z_v, 0)
//! ```
//!
//! Both updates use the variance at the start of the step. The rates are
//! constant for the whole run.

use super::rng::TrialRng;
use super::SimulationError;
use crate::model::heston::HestonParameters;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One trading day.
pub const DEFAULT_TIME_STEP: f64 = 1.0 / 252.0;
pub const DEFAULT_TRIALS: usize = 10_000;
pub const DEFAULT_SEED: u64 = 42;
/// Upper bound on steps per path.
pub const MAX_STEPS: usize = 1_000_000;

/// Which time steps a [`SimulatedPath`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recording {
    /// Step 0 and the steps of the requested observation times.
    #[default]
    Observations,
    /// Every daily step.
    EveryStep,
}

/// Run-level inputs to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial spot, domestic per foreign.
    pub spot: f64,
    /// Continuously-compounded domestic short rate.
    pub r_domestic: f64,
    /// Continuously-compounded foreign short rate.
    pub r_foreign: f64,
    pub trials: usize,
    pub time_step: f64,
    pub seed: u64,
    pub recording: Recording,
}

impl SimulationConfig {
    pub fn new(spot: f64, r_domestic: f64, r_foreign: f64) -> Self {
        Self {
            spot,
            r_domestic,
            r_foreign,
            trials: DEFAULT_TRIALS,
            time_step: DEFAULT_TIME_STEP,
            seed: DEFAULT_SEED,
            recording: Recording::Observations,
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_recording(mut self, recording: Recording) -> Self {
        self.recording = recording;
        self
    }
}

/// One recorded point of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    pub step: usize,
    /// `step · dt`, in years.
    pub time: f64,
    pub spot: f64,
    pub variance: f64,
}

/// The recorded samples of a single trial, in step order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPath {
    trial: usize,
    samples: Vec<PathSample>,
}

impl SimulatedPath {
    pub fn trial(&self) -> usize {
        self.trial
    }

    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    pub fn sample_at_step(&self, step: usize) -> Option<&PathSample> {
        self.samples
            .binary_search_by_key(&step, |s| s.step)
            .ok()
            .map(|i| &self.samples[i])
    }

    /// Spot at `step`, if that step was recorded.
    pub fn spot_at_step(&self, step: usize) -> Option<f64> {
        self.sample_at_step(step).map(|s| s.spot)
    }

    /// The last recorded sample.
    pub fn terminal(&self) -> Option<&PathSample> {
        self.samples.last()
    }
}

/// Generates reproducible Heston paths for a fixed set of observation times.
///
/// # Examples
///
/// ```
/// use fx_hedge_engine::model::HestonParameters;
/// use fx_hedge_engine::simulation::{PathSimulator, SimulationConfig};
///
/// let params = HestonParameters::new(0.0036, 1.5, 0.0049, 0.3, -0.7);
/// let config = SimulationConfig::new(1.10, 0.04, 0.025).with_trials(64);
/// let simulator = PathSimulator::new(params, config, &[0.5, 1.0]).unwrap();
///
/// let paths = simulator.simulate().unwrap();
/// assert_eq!(paths.len(), 64);
/// assert!(paths[0].spot_at_step(simulator.step_index(1.0)).is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PathSimulator {
    params: HestonParameters,
    config: SimulationConfig,
    /// Sorted, deduplicated, always starting with 0.
    observation_steps: Vec<usize>,
    total_steps: usize,
}

impl PathSimulator {
    pub fn new(
        params: HestonParameters,
        config: SimulationConfig,
        observation_times: &[f64],
    ) -> Result<Self, SimulationError> {
        if config.trials < 1 {
            return Err(SimulationError::InvalidTrialCount(config.trials));
        }
        if !config.time_step.is_finite() || config.time_step <= 0.0 {
            return Err(SimulationError::InvalidTimeStep(config.time_step));
        }
        if !config.spot.is_finite() || config.spot <= 0.0 {
            return Err(SimulationError::InvalidSpot(config.spot));
        }
        if !config.r_domestic.is_finite() {
            return Err(SimulationError::InvalidRate {
                name: "domestic",
                value: config.r_domestic,
            });
        }
        if !config.r_foreign.is_finite() {
            return Err(SimulationError::InvalidRate {
                name: "foreign",
                value: config.r_foreign,
            });
        }
        params.validate()?;

        let mut observation_steps = vec![0usize];
        for &t in observation_times {
            if !t.is_finite() || t < 0.0 {
                return Err(SimulationError::InvalidObservationTime(t));
            }
            let raw = (t / config.time_step + 1e-9).floor();
            if raw > MAX_STEPS as f64 {
                return Err(SimulationError::TooManySteps {
                    steps: raw as usize,
                    max: MAX_STEPS,
                });
            }
            observation_steps.push(raw as usize);
        }
        observation_steps.sort_unstable();
        observation_steps.dedup();
        let total_steps = observation_steps.last().copied().unwrap_or(0);

        debug!(
            "path simulator: {} trials x {} steps, {} observation steps, seed {}",
            config.trials,
            total_steps,
            observation_steps.len(),
            config.seed
        );

        Ok(Self {
            params,
            config,
            observation_steps,
            total_steps,
        })
    }

    pub fn params(&self) -> &HestonParameters {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn observation_steps(&self) -> &[usize] {
        &self.observation_steps
    }

    /// Step at which time `t` is observed: `floor(t / dt)`.
    pub fn step_index(&self, t: f64) -> usize {
        (t.max(0.0) / self.config.time_step + 1e-9).floor() as usize
    }

    /// Lazy, sequential sequence of all trials.
    pub fn iter(&self) -> impl Iterator<Item = Result<SimulatedPath, SimulationError>> + '_ {
        (0..self.config.trials).map(move |trial| self.simulate_trial(trial))
    }

    /// All trials, computed in parallel. Identical to collecting [`iter`](Self::iter).
    pub fn simulate(&self) -> Result<Vec<SimulatedPath>, SimulationError> {
        (0..self.config.trials)
            .into_par_iter()
            .map(|trial| self.simulate_trial(trial))
            .collect()
    }

    /// Simulate a single trial from its own random sub-stream.
    pub fn simulate_trial(&self, trial: usize) -> Result<SimulatedPath, SimulationError> {
        let HestonParameters {
            v0,
            kappa,
            theta,
            xi,
            rho,
        } = self.params;
        let dt = self.config.time_step;
        let carry = (self.config.r_domestic - self.config.r_foreign) * dt;
        let rho_complement = (1.0 - rho * rho).max(0.0).sqrt();
        let every_step = self.config.recording == Recording::EveryStep;

        let capacity = if every_step {
            self.total_steps + 1
        } else {
            self.observation_steps.len()
        };
        let mut samples = Vec::with_capacity(capacity);
        samples.push(PathSample {
            step: 0,
            time: 0.0,
            spot: self.config.spot,
            variance: v0,
        });

        let mut rng = TrialRng::new(self.config.seed, trial as u64);
        let mut log_spot = self.config.spot.ln();
        let mut variance = v0;
        // Index into observation_steps of the next step to record; 0 is done.
        let mut next_obs = 1;

        for step in 1..=self.total_steps {
            let v_pos = variance.max(0.0);
            let diffusion = (v_pos * dt).sqrt();
            let (z_s, z_v) = rng.correlated_pair(rho, rho_complement);

            log_spot += carry - 0.5 * v_pos * dt + diffusion * z_s;
            variance = (variance + kappa * (theta - v_pos) * dt + xi * diffusion * z_v).max(0.0);

            if !log_spot.is_finite() || !variance.is_finite() {
                return Err(SimulationError::NonFinite {
                    trial,
                    step,
                    log_spot,
                    variance,
                });
            }

            let record = every_step
                || self
                    .observation_steps
                    .get(next_obs)
                    .is_some_and(|&s| s == step);
            if record {
                let spot = log_spot.exp();
                if !spot.is_finite() || spot <= 0.0 {
                    return Err(SimulationError::SpotOverflow { trial, step });
                }
                samples.push(PathSample {
                    step,
                    time: step as f64 * dt,
                    spot,
                    variance,
                });
                if self.observation_steps.get(next_obs) == Some(&step) {
                    next_obs += 1;
                }
            }
        }

        Ok(SimulatedPath { trial, samples })
    }
}
