//! Simulated sessions: a known observer answers the estimator's stimuli.
//!
//! Used to check that the estimator recovers a ground truth and to explore how
//! many trials a configuration needs. Each run is deterministic given its seed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{CsfEstimate, ResultUnits, SimulationConfig, TrialRecord};
use crate::error::EstimatorError;
use crate::estimator::QuickCsfEstimator;
use crate::grid::{exponentiate, map_parameters};

pub mod observer;

pub use observer::*;

/// Outcome of one simulated session.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub seed: u64,
    pub true_indices: [f64; 4],
    pub truth: CsfEstimate,
    pub estimated_indices: [f64; 4],
    pub estimate: CsfEstimate,
    pub history: Vec<TrialRecord>,
}

impl SimulationRun {
    /// Absolute estimation error per dimension, in grid steps.
    pub fn index_errors(&self) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = (self.estimated_indices[i] - self.true_indices[i]).abs();
        }
        out
    }
}

/// Per-dimension spread of estimated indices across runs.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub runs: usize,
    pub mean_indices: [f64; 4],
    pub std_indices: [f64; 4],
    pub mean_abs_error: [f64; 4],
}

/// Expected information gain over the stimulus grid after a simulated session.
///
/// `gains` is flat in stimulus order: contrast is the fastest-varying index.
#[derive(Debug, Clone, Serialize)]
pub struct GainMap {
    pub trials: usize,
    pub contrasts: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub gains: Vec<f64>,
    pub estimate: CsfEstimate,
}

/// Run a single simulated session with the configured seed.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationRun, EstimatorError> {
    config.validate()?;
    run_seeded(config, config.seed)
}

/// Run `config.runs` independent sessions in parallel, each with a derived seed.
pub fn run_batch(config: &SimulationConfig) -> Result<Vec<SimulationRun>, EstimatorError> {
    config.validate()?;
    (0..config.runs)
        .into_par_iter()
        .map(|i| run_seeded(config, run_seed(config.seed, i)))
        .collect()
}

/// Run one session and then map the expected gain of every stimulus.
pub fn run_gain_map(config: &SimulationConfig) -> Result<GainMap, EstimatorError> {
    config.validate()?;
    let mut estimator = run_session(config, config.seed)?;
    let gains = estimator.expected_gains()?;
    let stimuli = estimator.stimulus_space();
    Ok(GainMap {
        trials: estimator.history().len(),
        contrasts: stimuli.contrasts().to_vec(),
        frequencies: stimuli.frequencies().to_vec(),
        gains,
        estimate: estimator.results(ResultUnits::Physical),
    })
}

fn run_session(config: &SimulationConfig, seed: u64) -> Result<QuickCsfEstimator, EstimatorError> {
    let truth = config.true_index_values();
    info!(
        "Starting simulation: seed={seed}, trials={}, truth={:?}, mode={:?}",
        config.trials, truth, config.response_mode
    );

    let mut estimator = QuickCsfEstimator::with_seed(config.estimator.clone(), seed)?;
    let observer = SimulatedObserver::new(truth, config.response_mode);
    let mut rng = StdRng::seed_from_u64(observer_seed(seed));

    for _ in 0..config.trials {
        let stimulus = estimator.next()?;
        let correct = observer.respond(&stimulus, &mut rng);
        estimator.mark_response(correct)?;
    }
    Ok(estimator)
}

fn run_seeded(config: &SimulationConfig, seed: u64) -> Result<SimulationRun, EstimatorError> {
    let truth = config.true_index_values();
    let estimator = run_session(config, seed)?;

    let estimated_indices = estimator.mean_indices();
    let run = SimulationRun {
        seed,
        true_indices: truth,
        truth: exponentiate(&map_parameters(truth)),
        estimated_indices,
        estimate: estimator.results(ResultUnits::Physical),
        history: estimator.history().to_vec(),
    };
    info!("Simulation complete: estimate={:?}", run.estimated_indices);
    Ok(run)
}

/// Mean, standard deviation and mean absolute error of estimated indices.
pub fn summarize(runs: &[SimulationRun]) -> Option<BatchSummary> {
    if runs.is_empty() {
        return None;
    }
    let n = runs.len() as f64;
    let mut mean = [0.0; 4];
    let mut mae = [0.0; 4];
    for run in runs {
        let errors = run.index_errors();
        for d in 0..4 {
            mean[d] += run.estimated_indices[d] / n;
            mae[d] += errors[d] / n;
        }
    }
    let mut std = [0.0; 4];
    for run in runs {
        for d in 0..4 {
            let dev = run.estimated_indices[d] - mean[d];
            std[d] += dev * dev / n;
        }
    }
    Some(BatchSummary {
        runs: runs.len(),
        mean_indices: mean,
        std_indices: std.map(f64::sqrt),
        mean_abs_error: mae,
    })
}

fn run_seed(base: u64, run: usize) -> u64 {
    if run == 0 {
        return base;
    }
    let mut hasher = DefaultHasher::new();
    base.hash(&mut hasher);
    run.hash(&mut hasher);
    hasher.finish()
}

fn observer_seed(seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    "observer".hash(&mut hasher);
    hasher.finish()
}
