//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed across the estimator boundary by the trial controller
//! - printed as JSON summaries
//! - rebuilt from a recorded session for replay

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;
use crate::grid::ParameterDimension;

/// A stimulus as presented to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    /// Michelson contrast, `(0, 1]`.
    pub contrast: f64,
    /// Spatial frequency in cycles per degree.
    pub frequency: f64,
}

impl Stimulus {
    /// Sensitivity demanded by this stimulus (`1/contrast`).
    pub fn sensitivity(&self) -> f64 {
        1.0 / self.contrast
    }
}

/// One answered trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub stimulus: Stimulus,
    pub correct: bool,
}

/// CSF parameters in model units.
///
/// Peak sensitivity, peak frequency and bandwidth are log10 values; `delta` is the
/// depth of the low-frequency truncation in log10 sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsfParameters {
    pub peak_sensitivity: f64,
    pub peak_frequency: f64,
    pub log_bandwidth: f64,
    pub delta: f64,
}

/// The four CSF parameter estimates.
///
/// Depending on [`ResultUnits`] the fields hold either posterior-mean grid indices
/// or physical values (1/contrast, cycles/degree, octaves, 1/contrast).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsfEstimate {
    pub peak_sensitivity: f64,
    pub peak_frequency: f64,
    pub bandwidth: f64,
    pub delta: f64,
}

impl CsfEstimate {
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            peak_sensitivity: values[0],
            peak_frequency: values[1],
            bandwidth: values[2],
            delta: values[3],
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [
            self.peak_sensitivity,
            self.peak_frequency,
            self.bandwidth,
            self.delta,
        ]
    }
}

/// How [`CsfEstimate`] values are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultUnits {
    /// Posterior-mean indices into the parameter grid (fractional).
    Indices,
    /// Real-world, linear-scale values.
    #[default]
    Physical,
}

/// How a simulated observer answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Draw the answer from the psychometric function of the true parameters.
    Probabilistic,
    /// Answer correctly iff the true sensitivity exceeds the demanded sensitivity.
    Perfect,
}

/// Half a parameter step (log10): slack allowed when matching grid ends to stimulus bounds.
const PROBE_TOLERANCE: f64 = 0.05;

/// Largest flattened grid the estimator will allocate (posterior mass is one `f64` each).
pub const MAX_GRID_COMBINATIONS: usize = 50_000_000;

/// Construction-time configuration of the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub min_contrast: f64,
    pub max_contrast: f64,
    pub contrast_resolution: usize,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub frequency_resolution: usize,
    pub peak_sensitivity_resolution: usize,
    pub peak_frequency_resolution: usize,
    pub bandwidth_resolution: usize,
    pub delta_resolution: usize,
    /// Posterior samples drawn per stimulus selection.
    pub sample_count: usize,
    /// Share of top-ranked stimuli the selector draws from.
    pub top_fraction: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_contrast: 0.001,
            max_contrast: 1.0,
            contrast_resolution: 24,
            min_frequency: 0.2,
            max_frequency: 36.0,
            frequency_resolution: 20,
            peak_sensitivity_resolution: 28,
            peak_frequency_resolution: 21,
            bandwidth_resolution: 21,
            delta_resolution: 21,
            sample_count: 100,
            top_fraction: 0.1,
        }
    }
}

impl EstimatorConfig {
    pub fn parameter_resolutions(&self) -> [usize; 4] {
        [
            self.peak_sensitivity_resolution,
            self.peak_frequency_resolution,
            self.bandwidth_resolution,
            self.delta_resolution,
        ]
    }

    /// Check ranges, resolutions and that the parameter grid is testable by the stimulus grid.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        let (c0, c1) = (self.min_contrast, self.max_contrast);
        if !(c0.is_finite() && c1.is_finite() && c0 > 0.0 && c1 > c0 && c1 <= 1.0) {
            return Err(EstimatorError::InvalidRange {
                axis: "contrast",
                min: c0,
                max: c1,
                reason: "must satisfy 0 < min < max <= 1",
            });
        }
        let (f0, f1) = (self.min_frequency, self.max_frequency);
        if !(f0.is_finite() && f1.is_finite() && f0 > 0.0 && f1 > f0) {
            return Err(EstimatorError::InvalidRange {
                axis: "frequency",
                min: f0,
                max: f1,
                reason: "must satisfy 0 < min < max",
            });
        }
        for (axis, got) in [
            ("contrast", self.contrast_resolution),
            ("frequency", self.frequency_resolution),
        ] {
            if got < 2 {
                return Err(EstimatorError::InvalidResolution { axis, got, min: 2 });
            }
        }
        for dim in ParameterDimension::ALL {
            let got = self.parameter_resolutions()[dim.position()];
            if got == 0 {
                return Err(EstimatorError::InvalidResolution {
                    axis: dim.display_name(),
                    got,
                    min: 1,
                });
            }
        }
        check_grid_size(
            "stimulus",
            &[self.contrast_resolution, self.frequency_resolution],
        )?;
        check_grid_size("parameter", &self.parameter_resolutions())?;
        if self.sample_count == 0 {
            return Err(EstimatorError::InvalidSelectionPolicy(
                "sample count must be >= 1".to_string(),
            ));
        }
        let fraction = self.top_fraction;
        if !(fraction.is_finite() && fraction > 0.0 && fraction <= 1.0) {
            return Err(EstimatorError::InvalidSelectionPolicy(format!(
                "top fraction {fraction} must lie in (0, 1]"
            )));
        }

        check_probeable(
            ParameterDimension::PeakSensitivity,
            self.peak_sensitivity_resolution,
            (1.0 / c1).log10(),
            (1.0 / c0).log10(),
        )?;
        check_probeable(
            ParameterDimension::PeakFrequency,
            self.peak_frequency_resolution,
            f0.log10(),
            f1.log10(),
        )?;
        Ok(())
    }
}

fn check_grid_size(grid: &'static str, sizes: &[usize]) -> Result<(), EstimatorError> {
    let combinations = sizes.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
    match combinations {
        Some(n) if n <= MAX_GRID_COMBINATIONS => Ok(()),
        _ => Err(EstimatorError::GridTooLarge {
            grid,
            sizes: sizes.to_vec(),
            max: MAX_GRID_COMBINATIONS,
        }),
    }
}

fn check_probeable(
    dim: ParameterDimension,
    resolution: usize,
    probe_min: f64,
    probe_max: f64,
) -> Result<(), EstimatorError> {
    let param_min = dim.log_value(0.0);
    let param_max = dim.log_value(resolution.saturating_sub(1) as f64);
    if param_min < probe_min - PROBE_TOLERANCE || param_max > probe_max + PROBE_TOLERANCE {
        return Err(EstimatorError::UnprobeableParameterRange {
            parameter: dim.display_name(),
            param_min,
            param_max,
            probe_min,
            probe_max,
        });
    }
    Ok(())
}

/// Settings of a simulated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub estimator: EstimatorConfig,
    /// Ground truth as parameter-grid indices (peak sensitivity, peak frequency, bandwidth, delta).
    pub true_indices: [usize; 4],
    pub trials: usize,
    pub seed: u64,
    /// Independent repetitions (each with its own derived seed).
    pub runs: usize,
    pub response_mode: ResponseMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            true_indices: [18, 11, 12, 11],
            trials: 50,
            seed: 42,
            runs: 1,
            response_mode: ResponseMode::Probabilistic,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), EstimatorError> {
        self.estimator.validate()?;
        let sizes = self.estimator.parameter_resolutions();
        for dim in ParameterDimension::ALL {
            let index = self.true_indices[dim.position()];
            let size = sizes[dim.position()];
            if index >= size {
                return Err(EstimatorError::InvalidTrueParameters {
                    parameter: dim.display_name(),
                    index,
                    size,
                });
            }
        }
        if self.runs == 0 {
            return Err(EstimatorError::InvalidResolution {
                axis: "simulation runs",
                got: 0,
                min: 1,
            });
        }
        Ok(())
    }

    /// Ground truth as fractional indices, the form the CSF model accepts.
    pub fn true_index_values(&self) -> [f64; 4] {
        self.true_indices.map(|i| i as f64)
    }
}
