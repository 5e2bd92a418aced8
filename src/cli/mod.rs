//! Command-line parsing for the QuickCSF simulator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimator code.

use clap::{Args, Parser, Subcommand};

use crate::domain::{EstimatorConfig, ResponseMode, SimulationConfig};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "qcsf", version, about = "QuickCSF contrast sensitivity estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run simulated sessions against an observer with known CSF parameters.
    Simulate(SimulateArgs),
    /// Print the stimulus and parameter grids of a configuration.
    Grid(GridArgs),
    /// Map the expected information gain of every stimulus after a simulated session.
    Gain(GainArgs),
}

/// Stimulus grid, parameter grid and selection policy.
#[derive(Debug, Args, Clone)]
pub struct EstimatorArgs {
    /// Lowest contrast presented.
    #[arg(long, default_value_t = 0.001)]
    pub min_contrast: f64,

    /// Highest contrast presented.
    #[arg(long, default_value_t = 1.0)]
    pub max_contrast: f64,

    /// Number of contrast levels.
    #[arg(long, default_value_t = 24)]
    pub contrast_resolution: usize,

    /// Lowest spatial frequency (cpd).
    #[arg(long, default_value_t = 0.2)]
    pub min_frequency: f64,

    /// Highest spatial frequency (cpd).
    #[arg(long, default_value_t = 36.0)]
    pub max_frequency: f64,

    /// Number of frequency levels.
    #[arg(long, default_value_t = 20)]
    pub frequency_resolution: usize,

    /// Grid size for peak sensitivity.
    #[arg(long, default_value_t = 28)]
    pub peak_sensitivity_resolution: usize,

    /// Grid size for peak frequency.
    #[arg(long, default_value_t = 21)]
    pub peak_frequency_resolution: usize,

    /// Grid size for bandwidth.
    #[arg(long, default_value_t = 21)]
    pub bandwidth_resolution: usize,

    /// Grid size for low-frequency truncation (delta).
    #[arg(long, default_value_t = 21)]
    pub delta_resolution: usize,

    /// Posterior samples drawn per stimulus selection.
    #[arg(long, default_value_t = 100)]
    pub samples: usize,

    /// Fraction of best-ranked stimuli to draw the next one from.
    #[arg(long, default_value_t = 0.1)]
    pub top_fraction: f64,
}

/// Ground truth and response model of a simulated session.
#[derive(Debug, Args, Clone)]
pub struct SessionArgs {
    /// True peak sensitivity index.
    #[arg(long, default_value_t = 18)]
    pub true_peak_sensitivity: usize,

    /// True peak frequency index.
    #[arg(long, default_value_t = 11)]
    pub true_peak_frequency: usize,

    /// True bandwidth index.
    #[arg(long, default_value_t = 12)]
    pub true_bandwidth: usize,

    /// True delta index.
    #[arg(long, default_value_t = 11)]
    pub true_delta: usize,

    /// Trials per session.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub trials: usize,

    /// Random seed (estimator and observer).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// How the simulated observer answers.
    #[arg(long, value_enum, default_value_t = ResponseMode::Probabilistic)]
    pub responses: ResponseMode,
}

/// Options for simulated sessions.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub estimator: EstimatorArgs,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Number of independent sessions (seeds derived from `--seed`).
    #[arg(long, default_value_t = 1)]
    pub runs: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print the trial-by-trial history.
    #[arg(long)]
    pub history: bool,

    /// Emit results as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

/// Options for inspecting grids.
#[derive(Debug, Parser, Clone)]
pub struct GridArgs {
    #[command(flatten)]
    pub estimator: EstimatorArgs,
}

/// Options for the expected-gain map (`--trials 0` shows the prior).
#[derive(Debug, Parser, Clone)]
pub struct GainArgs {
    #[command(flatten)]
    pub estimator: EstimatorArgs,

    #[command(flatten)]
    pub session: SessionArgs,
}

impl EstimatorArgs {
    pub fn to_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            min_contrast: self.min_contrast,
            max_contrast: self.max_contrast,
            contrast_resolution: self.contrast_resolution,
            min_frequency: self.min_frequency,
            max_frequency: self.max_frequency,
            frequency_resolution: self.frequency_resolution,
            peak_sensitivity_resolution: self.peak_sensitivity_resolution,
            peak_frequency_resolution: self.peak_frequency_resolution,
            bandwidth_resolution: self.bandwidth_resolution,
            delta_resolution: self.delta_resolution,
            sample_count: self.samples,
            top_fraction: self.top_fraction,
        }
    }
}

impl SessionArgs {
    pub fn to_config(&self, estimator: EstimatorConfig, runs: usize) -> SimulationConfig {
        SimulationConfig {
            estimator,
            true_indices: [
                self.true_peak_sensitivity,
                self.true_peak_frequency,
                self.true_bandwidth,
                self.true_delta,
            ],
            trials: self.trials,
            seed: self.seed,
            runs,
            response_mode: self.responses,
        }
    }
}

impl GainArgs {
    pub fn to_config(&self) -> SimulationConfig {
        self.session.to_config(self.estimator.to_config(), 1)
    }
}

impl SimulateArgs {
    pub fn to_config(&self) -> SimulationConfig {
        self.session.to_config(self.estimator.to_config(), self.runs)
    }

    pub fn show_plot(&self) -> bool {
        self.plot && !self.no_plot && !self.json
    }
}
